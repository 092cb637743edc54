// Copyright @yucwang 2026

pub mod accumulator;
pub mod raytracer;
pub mod tiled;
