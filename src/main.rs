// Copyright 2020 TwoCookingMice

use spherelight::core::device::FramePool;
use spherelight::core::scene_loader::load_scene;
use spherelight::core::sensor::Sensor;
use spherelight::io;
use spherelight::math::bitmap::Bitmap;
use spherelight::math::constants::{Float, Vector4f};
use spherelight::renderers::raytracer::{FrameOutcome, RayTracer};
use spherelight::sensors::pinhole::PinholeCamera;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::time::Instant;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.xml> <output.exr|png> [--frames N] [--spp N] [--bounces N] \
                   [--no-accumulation] [--reset-on-change] [--disable] [--background IMAGE] \
                   [--max-frame-pixels N]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut frames: u32 = 1;
    let mut spp_override: Option<u32> = None;
    let mut bounces_override: Option<u32> = None;
    let mut accumulation: Option<bool> = None;
    let mut reset_on_change = false;
    let mut disabled = false;
    let mut background: Option<String> = None;
    let mut max_frame_pixels: Option<usize> = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--frames" => {
                i += 1;
                frames = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(frames).max(1);
            }
            "--spp" => {
                i += 1;
                spp_override = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--bounces" => {
                i += 1;
                bounces_override = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--no-accumulation" => accumulation = Some(false),
            "--reset-on-change" => reset_on_change = true,
            "--disable" => disabled = true,
            "--background" => {
                i += 1;
                background = args.get(i).cloned();
            }
            "--max-frame-pixels" => {
                i += 1;
                max_frame_pixels = args.get(i).and_then(|v| v.parse::<usize>().ok());
            }
            other => log::warn!("Ignoring unknown argument: {}.", other),
        }
        i += 1;
    }

    let load_result = match load_scene(input_path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let mut settings = load_result.settings;
    if let Some(spp) = spp_override {
        settings.set_rays_per_pixel(spp);
    }
    if let Some(bounces) = bounces_override {
        settings.set_bounces(bounces);
    }
    if frames > 1 {
        settings.texture_accumulation = true;
    }
    if let Some(accumulate) = accumulation {
        settings.texture_accumulation = accumulate;
    }
    settings.accumulation_reset_on_change |= reset_on_change;
    settings.enabled = !disabled;

    let mut camera = load_result.camera;
    let source = match background {
        Some(path) => match io::read_bitmap(&path) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                eprintln!("{} {}: {}", style("error:").red().bold(), path, e);
                std::process::exit(1);
            }
        },
        None => Bitmap::filled(load_result.width, load_result.height, Vector4f::new(0.0, 0.0, 0.0, 1.0)),
    };
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        eprintln!("{} empty input frame", style("error:").red().bold());
        std::process::exit(1);
    }
    camera.aspect = width as Float / height as Float;
    log::debug!("{}", PinholeCamera::new(&camera).describe());

    log::info!("Rendering {} frame(s) at {}x{}, {} bounces, {} rays per pixel.",
               frames, width, height, settings.bounces(), settings.rays_per_pixel());

    let scene = load_result.scene;
    let mut tracer = match max_frame_pixels {
        Some(max_pixels) => RayTracer::with_frame_pool(settings, FramePool::with_pixel_budget(max_pixels)),
        None => RayTracer::new(settings),
    };
    let mut output = Bitmap::new(width, height);
    let start = Instant::now();

    let progress = ProgressBar::new(frames as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut fallbacks = 0;
    for _ in 0..frames {
        if tracer.render_frame(&source, &mut output, &camera, &scene, true) == FrameOutcome::Fallback {
            fallbacks += 1;
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if fallbacks > 0 {
        log::warn!("{} frame(s) were traced without accumulation.", fallbacks);
    }
    if output.has_non_finite() {
        log::warn!("Output contains non-finite pixels.");
    }

    if let Err(e) = io::write_bitmap(output_path, &output) {
        eprintln!("{} {}: {}", style("error:").red().bold(), output_path, e);
        std::process::exit(2);
    }

    println!("{} {} frame(s) in {:.2}s -> {}",
             style("Rendered").green().bold(),
             frames,
             start.elapsed().as_secs_f64(),
             style(output_path).cyan());
}
