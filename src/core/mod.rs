// Copyright @yucwang 2021

pub mod config;
pub mod device;
pub mod error;
pub mod integrator;
pub mod rng;
pub mod sensor;
pub mod scene;
pub mod scene_loader;
