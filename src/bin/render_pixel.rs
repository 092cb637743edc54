use spherelight::core::device::SphereBuffer;
use spherelight::core::integrator::{Integrator, TraceContext};
use spherelight::core::scene::{build_scene_snapshot, SceneQuery};
use spherelight::core::scene_loader::load_scene;
use spherelight::emitters::sky::SkyEnvironment;
use spherelight::integrators::path::PathIntegrator;
use spherelight::sensors::pinhole::PinholeCamera;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y> [--spp N] [--bounces N] [--frame N]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let x: usize = args[2].parse().unwrap_or(0);
    let y: usize = args[3].parse().unwrap_or(0);

    let mut spp: Option<u32> = None;
    let mut bounces: Option<u32> = None;
    let mut frame_index: u32 = 1;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                spp = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--bounces" => {
                i += 1;
                bounces = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--frame" => {
                i += 1;
                frame_index = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(frame_index);
            }
            _ => {}
        }
        i += 1;
    }

    let load_result = match load_scene(scene_path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("failed to load scene: {}", e);
            std::process::exit(1);
        }
    };
    let (width, height) = (load_result.width, load_result.height);
    if x >= width || y >= height {
        eprintln!("Pixel out of bounds: ({}, {}) for size {}x{}", x, y, width, height);
        std::process::exit(2);
    }

    let mut settings = load_result.settings;
    if let Some(spp) = spp {
        settings.set_rays_per_pixel(spp);
    }
    if let Some(bounces) = bounces {
        settings.set_bounces(bounces);
    }

    let mut buffer = SphereBuffer::new();
    build_scene_snapshot(&load_result.scene).upload(&mut buffer);
    let spheres = buffer.decode();
    let mut environment = SkyEnvironment::default();
    settings.apply_to(&mut environment);
    let sensor = PinholeCamera::new(&load_result.camera);
    let ctx = TraceContext { spheres: &spheres, environment: &environment, sensor: &sensor, width, height };
    let integrator = PathIntegrator::new(settings.bounces(),
                                         settings.rays_per_pixel(),
                                         settings.safety_rejection_tries());

    let rgb = integrator.trace_pixel(&ctx, x, y, frame_index);
    println!("Pixel ({}, {}) frame {}: {:.6} {:.6} {:.6}", x, y, frame_index, rgb.x, rgb.y, rgb.z);
    println!("Spheres: {}, spp: {}, bounces: {}",
             load_result.scene.list_sphere_emitters().len(), integrator.samples_per_pixel(), integrator.max_depth);
}
