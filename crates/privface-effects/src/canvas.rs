// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canonical working canvas shared by DP Snow and DP Samp.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use privface_core::{CANONICAL_SIZE, PrivfaceError, Result};
use tracing::debug;

/// Resize `image` to the fixed `CANONICAL_SIZE` square and convert to RGB.
///
/// Aspect ratio is not preserved. Bicubic (Catmull-Rom) filtering is used.
pub fn to_canonical_rgb(image: &DynamicImage) -> Result<RgbImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PrivfaceError::UnsupportedInput(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }
    debug!(
        from_w = image.width(),
        from_h = image.height(),
        size = CANONICAL_SIZE,
        "Resizing to canonical canvas"
    );
    Ok(image
        .resize_exact(CANONICAL_SIZE, CANONICAL_SIZE, FilterType::CatmullRom)
        .to_rgb8())
}

/// ITU-R 601 luma, `(299 r + 587 g + 114 b) / 1000` rounded to nearest.
///
/// This is the weighting PIL's `convert("L")` uses, which DP Samp clusters on.
pub fn luma_601(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0.map(u32::from);
        Luma([((299 * r + 587 * g + 114 * b + 500) / 1000) as u8])
    })
}
