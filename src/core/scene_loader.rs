// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::config::RayTracerSettings;
use crate::core::scene::{SceneObject, StaticScene};
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBASpectrum;
use crate::sensors::pinhole::CameraState;
use crate::shapes::sphere::{Material, Sphere};

const DEFAULT_NEAR_CLIP: Float = 0.3;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "failed to read scene: {}", e),
            SceneLoadError::Parse(msg) => write!(f, "failed to parse scene: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "scene is missing {}", field),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub struct SceneLoadResult {
    pub scene: StaticScene,
    pub camera: CameraState,
    pub width: usize,
    pub height: usize,
    pub settings: RayTracerSettings,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let result = parse_scene(&xml)?;
    log::info!("Loaded {} spheres from {}, film {}x{}.",
               result.scene.len(), path.display(), result.width, result.height);
    Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EmitterKind {
    Area,
    Sky,
    Directional,
}

#[derive(Default)]
struct ShapeState {
    id: Option<String>,
    center: Option<Vector3f>,
    radius: Option<Float>,
    reflectance: Option<RGBASpectrum>,
    smoothness: Float,
    radiance: Option<RGBASpectrum>,
    intensity: Float,
}

#[derive(Default)]
struct SceneParser {
    defaults: HashMap<String, String>,

    in_sensor: bool,
    in_film: bool,
    in_transform: bool,
    in_integrator: bool,
    in_bsdf: bool,
    shape: Option<ShapeState>,
    emitter: Option<EmitterKind>,

    fov_deg: Option<Float>,
    near_clip: Option<Float>,
    origin: Option<Vector3f>,
    target: Option<Vector3f>,
    up: Option<Vector3f>,
    width: Option<usize>,
    height: Option<usize>,

    settings: RayTracerSettings,
    scene: StaticScene,
}

/// Parses a scene from an XML string. Unknown elements are skipped.
pub fn parse_scene(xml: &str) -> Result<SceneLoadResult, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut parser = SceneParser::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => parser.start(&e)?,
            Ok(Event::Empty(e)) => {
                parser.start(&e)?;
                parser.end(e.name().as_ref())?;
            }
            Ok(Event::End(e)) => parser.end(e.name().as_ref())?,
            Err(e) => {
                return Err(SceneLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    parser.finish()
}

impl SceneParser {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<(), SceneLoadError> {
        let attrs = self.attributes(e);
        let kind = attrs.get("type").map(String::as_str);
        match e.name().as_ref() {
            b"default" => {
                if let (Some(k), Some(v)) = (attrs.get("name"), attrs.get("value")) {
                    self.defaults.insert(k.clone(), v.clone());
                }
            }
            b"sensor" => {
                if kind != Some("perspective") {
                    return Err(SceneLoadError::Parse(format!("unsupported sensor: {}", kind.unwrap_or(""))));
                }
                self.in_sensor = true;
            }
            b"film" => self.in_film = self.in_sensor,
            b"transform" => self.in_transform = self.in_sensor,
            b"lookat" => {
                if self.in_sensor && self.in_transform {
                    self.origin = attrs.get("origin").map(|v| parse_vec3(v)).transpose()?;
                    self.target = attrs.get("target").map(|v| parse_vec3(v)).transpose()?;
                    self.up = attrs.get("up").map(|v| parse_vec3(v)).transpose()?;
                }
            }
            b"integrator" => {
                if kind != Some("path") {
                    return Err(SceneLoadError::Parse(format!("unsupported integrator: {}", kind.unwrap_or(""))));
                }
                self.in_integrator = true;
            }
            b"shape" => {
                if kind != Some("sphere") {
                    return Err(SceneLoadError::Parse(format!("unsupported shape: {}", kind.unwrap_or(""))));
                }
                self.shape = Some(ShapeState {
                    id: attrs.get("id").cloned(),
                    ..ShapeState::default()
                });
            }
            b"bsdf" => {
                if self.shape.is_some() {
                    if kind != Some("diffuse") {
                        return Err(SceneLoadError::Parse(format!("unsupported bsdf: {}", kind.unwrap_or(""))));
                    }
                    self.in_bsdf = true;
                }
            }
            b"emitter" => {
                self.emitter = match (kind, self.shape.is_some()) {
                    (Some("area"), true) => Some(EmitterKind::Area),
                    (Some("sky"), false) => Some(EmitterKind::Sky),
                    (Some("directional"), false) => Some(EmitterKind::Directional),
                    _ => {
                        return Err(SceneLoadError::Parse(format!("unsupported emitter: {}", kind.unwrap_or(""))));
                    }
                };
            }
            b"float" => {
                let (name, value) = named_value(&attrs)?;
                self.set_float(name, parse_float(value)?);
            }
            b"integer" => {
                let (name, value) = named_value(&attrs)?;
                self.set_integer(name, value)?;
            }
            b"boolean" => {
                let (name, value) = named_value(&attrs)?;
                let flag = parse_bool(value)?;
                if self.in_integrator {
                    match name {
                        "accumulate" => self.settings.texture_accumulation = flag,
                        "reset_on_change" => self.settings.accumulation_reset_on_change = flag,
                        _ => {}
                    }
                }
            }
            b"rgb" => {
                let (name, value) = named_value(&attrs)?;
                self.set_rgb(name, parse_spectrum(value)?);
            }
            b"point" | b"vector" => {
                let name = attrs.get("name").ok_or(SceneLoadError::MissingField("name"))?;
                let v = if let Some(value) = attrs.get("value") {
                    parse_vec3(value)?
                } else {
                    let mut xyz = [0.0; 3];
                    for (slot, key) in xyz.iter_mut().zip(["x", "y", "z"]) {
                        if let Some(value) = attrs.get(key) {
                            *slot = parse_float(value)?;
                        }
                    }
                    Vector3f::new(xyz[0], xyz[1], xyz[2])
                };
                self.set_vector(name, v);
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> Result<(), SceneLoadError> {
        match name {
            b"sensor" => {
                self.in_sensor = false;
                self.in_film = false;
                self.in_transform = false;
            }
            b"film" => self.in_film = false,
            b"transform" => self.in_transform = false,
            b"integrator" => self.in_integrator = false,
            b"bsdf" => self.in_bsdf = false,
            b"emitter" => self.emitter = None,
            b"shape" => {
                if let Some(state) = self.shape.take() {
                    self.add_sphere(state)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<SceneLoadResult, SceneLoadError> {
        let width = self.width.ok_or(SceneLoadError::MissingField("film.width"))?;
        let height = self.height.ok_or(SceneLoadError::MissingField("film.height"))?;
        if width == 0 || height == 0 {
            return Err(SceneLoadError::Parse(format!("empty film: {}x{}", width, height)));
        }
        let fov = self.fov_deg.ok_or(SceneLoadError::MissingField("sensor.fov"))?;
        let origin = self.origin.ok_or(SceneLoadError::MissingField("sensor.lookat.origin"))?;
        let target = self.target.ok_or(SceneLoadError::MissingField("sensor.lookat.target"))?;
        let up = self.up.unwrap_or_else(|| Vector3f::new(0.0, 1.0, 0.0));

        let camera = CameraState::look_at(origin, target, up, fov,
                                          self.near_clip.unwrap_or(DEFAULT_NEAR_CLIP),
                                          width as Float / height as Float);

        Ok(SceneLoadResult {
            scene: self.scene,
            camera,
            width,
            height,
            settings: self.settings,
        })
    }

    fn add_sphere(&mut self, state: ShapeState) -> Result<(), SceneLoadError> {
        let center = state.center.ok_or(SceneLoadError::MissingField("shape.center"))?;
        let radius = state.radius.ok_or(SceneLoadError::MissingField("shape.radius"))?;
        let mut material = Material::diffuse(state.reflectance.unwrap_or(RGBASpectrum::WHITE))
            .with_smoothness(state.smoothness);
        if let Some(radiance) = state.radiance {
            material = material.with_emission(radiance, state.intensity);
        }

        let mut object = SceneObject::new(Sphere::new(center, radius, material));
        if let Some(id) = state.id {
            object = object.with_name(id);
        }
        self.scene.add_object(object);
        Ok(())
    }

    fn set_float(&mut self, name: &str, value: Float) {
        if self.in_sensor {
            match name {
                "fov" => self.fov_deg = Some(value),
                "near_clip" => self.near_clip = Some(value),
                _ => {}
            }
            return;
        }
        if let Some(shape) = self.shape.as_mut() {
            match (name, self.in_bsdf, self.emitter) {
                ("radius", false, None) => shape.radius = Some(value),
                ("smoothness", true, _) => shape.smoothness = value,
                ("intensity", _, Some(EmitterKind::Area)) => shape.intensity = value,
                _ => {}
            }
            return;
        }
        match (name, self.emitter) {
            ("sun_strength", Some(_)) => self.settings.sun_strength = value,
            ("sun_focus", Some(_)) => self.settings.sun_focus = value,
            _ => {}
        }
    }

    fn set_integer(&mut self, name: &str, value: &str) -> Result<(), SceneLoadError> {
        if self.in_film {
            match name {
                "width" => self.width = Some(parse_usize(value)?),
                "height" => self.height = Some(parse_usize(value)?),
                _ => {}
            }
        } else if self.in_integrator {
            match name {
                "max_depth" => self.settings.set_bounces(parse_u32(value)?),
                "sample_count" => self.settings.set_rays_per_pixel(parse_u32(value)?),
                "rejection_tries" => self.settings.set_safety_rejection_tries(parse_u32(value)?),
                _ => {}
            }
        }
        Ok(())
    }

    fn set_rgb(&mut self, name: &str, value: RGBASpectrum) {
        if let Some(shape) = self.shape.as_mut() {
            match (name, self.in_bsdf, self.emitter) {
                ("reflectance", true, _) => shape.reflectance = Some(value),
                ("radiance", _, Some(EmitterKind::Area)) => shape.radiance = Some(value),
                _ => {}
            }
            return;
        }
        match (name, self.emitter) {
            ("sky_color", Some(EmitterKind::Sky)) => self.settings.sky_color = value,
            ("sky_bottom", Some(EmitterKind::Sky)) => self.settings.sky_bottom = value,
            ("horizon_color", Some(EmitterKind::Sky)) => self.settings.horizon_color = value,
            ("sun_color", Some(_)) => self.settings.sun_color = value,
            _ => {}
        }
    }

    fn set_vector(&mut self, name: &str, value: Vector3f) {
        if let Some(shape) = self.shape.as_mut() {
            if name == "center" {
                shape.center = Some(value);
            }
            return;
        }
        match (name, self.emitter) {
            ("sun_direction", Some(EmitterKind::Sky)) => self.settings.set_sun_direction(value),
            // directional emitters give the direction light travels in
            ("direction", Some(EmitterKind::Directional)) => self.settings.set_sun_direction(-value),
            _ => {}
        }
    }

    fn attributes(&self, e: &BytesStart<'_>) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = resolve_value(&attr.unescape_value().unwrap_or_default(), &self.defaults);
            attrs.insert(key, value);
        }
        attrs
    }
}

fn named_value(attrs: &HashMap<String, String>) -> Result<(&str, &str), SceneLoadError> {
    let name = attrs.get("name").ok_or(SceneLoadError::MissingField("name"))?;
    let value = attrs.get("value").ok_or(SceneLoadError::MissingField("value"))?;
    Ok((name, value))
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, SceneLoadError> {
    value.trim().parse::<u32>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, SceneLoadError> {
    value.trim().parse::<usize>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, SceneLoadError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SceneLoadError::Parse(format!("invalid boolean: {}", value))),
    }
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

fn parse_spectrum(value: &str) -> Result<RGBASpectrum, SceneLoadError> {
    Ok(RGBASpectrum::from_rgb(parse_vec3(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneQuery;
    use std::io::Write;

    const SCENE: &str = r#"
<scene version="3.0.0">
    <default name="spp" value="4"/>
    <sensor type="perspective">
        <float name="fov" value="45"/>
        <float name="near_clip" value="0.1"/>
        <transform name="to_world">
            <lookat origin="0, 1, -6" target="0, 0, 0" up="0, 1, 0"/>
        </transform>
        <film type="hdrfilm">
            <integer name="width" value="64"/>
            <integer name="height" value="32"/>
        </film>
    </sensor>
    <integrator type="path">
        <integer name="max_depth" value="200"/>
        <integer name="sample_count" value="$spp"/>
        <boolean name="accumulate" value="true"/>
    </integrator>
    <emitter type="sky">
        <rgb name="sky_color" value="0.5, 0.6, 0.9"/>
        <float name="sun_strength" value="20"/>
        <vector name="sun_direction" x="0" y="2" z="0"/>
    </emitter>
    <shape type="sphere" id="ball">
        <point name="center" x="0" y="0" z="0"/>
        <float name="radius" value="1"/>
        <bsdf type="diffuse">
            <rgb name="reflectance" value="0.8, 0.2, 0.2"/>
            <float name="smoothness" value="0.5"/>
        </bsdf>
    </shape>
    <shape type="sphere">
        <point name="center" value="3, 0, 0"/>
        <float name="radius" value="-1"/>
        <emitter type="area">
            <rgb name="radiance" value="1, 1, 1"/>
            <float name="intensity" value="500"/>
        </emitter>
    </shape>
</scene>
"#;

    #[test]
    fn test_parse_scene() {
        let result = parse_scene(SCENE).unwrap();
        assert_eq!((result.width, result.height), (64, 32));
        assert_eq!(result.camera.field_of_view, 45.0);
        assert_eq!(result.camera.near_clip, 0.1);
        assert_eq!(result.camera.aspect, 2.0);
        assert!((result.camera.position() - Vector3f::new(0.0, 1.0, -6.0)).norm() < 1e-5);

        let settings = &result.settings;
        assert_eq!(settings.bounces(), 50);
        assert_eq!(settings.rays_per_pixel(), 4);
        assert!(settings.texture_accumulation);
        assert!(!settings.accumulation_reset_on_change);
        assert_eq!(settings.sky_color, RGBASpectrum::new(0.5, 0.6, 0.9, 1.0));
        assert_eq!(settings.sun_strength, 20.0);
        assert_eq!(settings.sun_direction(), Vector3f::new(0.0, 2.0, 0.0));

        let spheres = result.scene.list_sphere_emitters();
        assert_eq!(spheres.len(), 2);
        assert_eq!(result.scene.objects()[0].name.as_deref(), Some("ball"));
        let ball = spheres[0].material();
        assert_eq!(ball.base_color(), RGBASpectrum::new(0.8, 0.2, 0.2, 1.0));
        assert_eq!(ball.smoothness(), 0.5);
        assert_eq!(ball.emission_intensity(), 0.0);

        assert_eq!(spheres[1].position(), Vector3f::new(3.0, 0.0, 0.0));
        assert_eq!(spheres[1].radius(), 0.0);
        assert_eq!(spheres[1].material().emission_intensity(), 100.0);
    }

    #[test]
    fn test_directional_emitter_sets_sun() {
        let xml = r#"
<scene>
    <sensor type="perspective">
        <float name="fov" value="60"/>
        <transform name="to_world"><lookat origin="0,0,-1" target="0,0,0"/></transform>
        <film><integer name="width" value="8"/><integer name="height" value="8"/></film>
    </sensor>
    <emitter type="directional">
        <vector name="direction" x="0" y="-1" z="0"/>
        <rgb name="sun_color" value="1, 0.9, 0.8"/>
    </emitter>
</scene>"#;
        let result = parse_scene(xml).unwrap();
        assert_eq!(result.settings.sun_direction(), Vector3f::new(0.0, 1.0, 0.0));
        assert_eq!(result.settings.sun_color, RGBASpectrum::new(1.0, 0.9, 0.8, 1.0));
        assert_eq!(result.camera.near_clip, DEFAULT_NEAR_CLIP);
        assert!(result.scene.is_empty());
    }

    #[test]
    fn test_missing_and_invalid_fields() {
        let no_film = r#"<scene><sensor type="perspective"><float name="fov" value="60"/></sensor></scene>"#;
        assert!(matches!(parse_scene(no_film), Err(SceneLoadError::MissingField("film.width"))));

        let no_radius = r#"<scene><shape type="sphere"><point name="center" x="0" y="0" z="0"/></shape></scene>"#;
        assert!(matches!(parse_scene(no_radius), Err(SceneLoadError::MissingField("shape.radius"))));

        let mesh = r#"<scene><shape type="obj"/></scene>"#;
        assert!(matches!(parse_scene(mesh), Err(SceneLoadError::Parse(_))));

        let bad_float = r#"<scene><sensor type="perspective"><float name="fov" value="wide"/></sensor></scene>"#;
        let err = parse_scene(bad_float).err().unwrap();
        assert_eq!(err.to_string(), "failed to parse scene: invalid float: wide");
    }

    #[test]
    fn test_load_scene_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENE.as_bytes()).unwrap();
        let result = load_scene(file.path()).unwrap();
        assert_eq!(result.scene.len(), 2);

        let missing = load_scene(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(SceneLoadError::Io(_))));
    }
}
