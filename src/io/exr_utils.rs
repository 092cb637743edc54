/* Copyright 2020 @TwoCookingMice */

use crate::io::ImageIoError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector4f;

use exr::prelude::*;
use std::path::Path;

// Write EXR Image to file
pub fn write_bitmap_exr(file_path: &Path, bitmap: &Bitmap) -> std::result::Result<(), ImageIoError> {
    log::info!("Starting writing openexr images: {}.", file_path.display());

    write_rgba_file(file_path, bitmap.width(), bitmap.height(), |x, y| {
        let p = bitmap[(x, y)];
        (p.x, p.y, p.z, p.w)
    })?;

    log::info!("EXR written to: {}.", file_path.display());
    Ok(())
}

// Read EXR Image from file
pub fn read_bitmap_exr(file_path: &Path) -> std::result::Result<Bitmap, ImageIoError> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path.display());

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
            |bitmap: &mut Bitmap, position, (r, g, b, a): (f32, f32, f32, f32)| {
                bitmap[(position.x(), position.y())] = Vector4f::new(r, g, b, a);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)?;

    let bitmap = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", bitmap.width(), bitmap.height());
    Ok(bitmap)
}
