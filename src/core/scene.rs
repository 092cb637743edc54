// Copyright @yucwang 2026

use crate::core::device::SphereBuffer;
use crate::shapes::sphere::Sphere;

/// Source of the spheres that are live in the host scene. Queried once per
/// frame, the order of the result does not matter to the tracer.
pub trait SceneQuery {
    fn list_sphere_emitters(&self) -> Vec<Sphere>;
}

/// Per-frame copy of the scene spheres handed to the tracer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSnapshot {
    spheres: Vec<Sphere>,
}

impl SceneSnapshot {
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Self { spheres }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Packs the snapshot into `buffer`, see `SphereBuffer::upload`.
    pub fn upload(&self, buffer: &mut SphereBuffer) -> bool {
        buffer.upload(&self.spheres)
    }
}

pub fn build_scene_snapshot(query: &dyn SceneQuery) -> SceneSnapshot {
    let spheres = query
        .list_sphere_emitters()
        .iter()
        .map(|s| Sphere::new(s.position(), s.radius(), *s.material()))
        .collect();
    SceneSnapshot::new(spheres)
}

pub struct SceneObject {
    pub sphere: Sphere,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn new(sphere: Sphere) -> Self {
        Self { sphere, name: None }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }
}

/// Scene held in memory, as built by the scene loader or by hand.
#[derive(Default)]
pub struct StaticScene {
    objects: Vec<SceneObject>,
}

impl StaticScene {
    pub fn new() -> Self {
        Self { objects: Vec::new() }
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &Vec<SceneObject> {
        &self.objects
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name.as_deref() == Some(name))
    }

    pub fn remove_object(&mut self, name: &str) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.name.as_deref() == Some(name))?;
        Some(self.objects.remove(index))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl SceneQuery for StaticScene {
    fn list_sphere_emitters(&self) -> Vec<Sphere> {
        self.objects.iter().map(|o| o.sphere).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::RGBASpectrum;
    use crate::shapes::sphere::Material;

    #[test]
    fn test_empty_scene_gives_empty_snapshot() {
        let scene = StaticScene::new();
        let snapshot = build_scene_snapshot(&scene);
        assert!(snapshot.is_empty());

        let mut buffer = SphereBuffer::new();
        snapshot.upload(&mut buffer);
        assert!(buffer.is_empty());
        assert!(buffer.as_bytes().is_empty());
    }

    #[test]
    fn test_snapshot_follows_live_objects() {
        let mut scene = StaticScene::new();
        scene.add_object(SceneObject::new(Sphere::new(Vector3f::zeros(), 1.0, Material::default()))
            .with_name(String::from("ball")));
        scene.add_object(SceneObject::new(Sphere::new(Vector3f::new(3.0, 0.0, 0.0), -2.0,
                                                      Material::diffuse(RGBASpectrum::BLUE))));

        let snapshot = build_scene_snapshot(&scene);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.spheres()[1].radius(), 0.0);

        scene.object_mut("ball").unwrap().sphere.set_position(Vector3f::new(0.0, 1.0, 0.0));
        let moved = build_scene_snapshot(&scene);
        assert_eq!(moved.spheres()[0].position(), Vector3f::new(0.0, 1.0, 0.0));
        assert_ne!(moved, snapshot);

        scene.object_mut("ball").unwrap().sphere.set_material(Material::default().with_smoothness(2.0));
        assert_eq!(build_scene_snapshot(&scene).spheres()[0].material().smoothness(), 1.0);

        assert!(scene.remove_object("ball").is_some());
        assert!(scene.remove_object("ball").is_none());
        assert_eq!(build_scene_snapshot(&scene).len(), 1);
    }
}
