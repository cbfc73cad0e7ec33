// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DP Pix — block pixelation with calibrated Laplace noise on each block mean.

pub mod blocks;
pub mod laplace;

use image::{DynamicImage, RgbImage};
use privface_core::{PixParams, PrivfaceError, Result};
use rand::Rng;
use rand_distr::Distribution;
use tracing::{debug, info, instrument};

use self::blocks::{block_means, expand_blocks};
use self::laplace::Laplace;

/// Pixelate `image` into `block_size` blocks and perturb each block mean.
///
/// ## Pipeline
///
/// 1. Convert to RGB and crop to a multiple of `block_size` on both axes
/// 2. Average each block per channel
/// 3. Add one `Laplace(0, 255·m / (b²·ε))` draw per block per channel
/// 4. Paint the noised means back over their blocks, clamped to 8 bits
///
/// Draws are taken in block row, block column, channel order, so a fixed
/// seed reproduces the output exactly. All validation happens before the
/// first draw.
#[instrument(skip(image, rng), fields(width = image.width(), height = image.height()))]
pub fn dp_pix<R: Rng + ?Sized>(
    image: &DynamicImage,
    params: &PixParams,
    rng: &mut R,
) -> Result<RgbImage> {
    params.validate()?;
    let (width, height) = (image.width(), image.height());
    if params.block_size > width || params.block_size > height {
        return Err(PrivfaceError::invalid(
            "block_size",
            format!(
                "{} exceeds image dimensions {}x{}",
                params.block_size, width, height
            ),
        ));
    }

    let scale = params.noise_scale();
    let laplace = Laplace::new(scale).ok_or_else(|| {
        PrivfaceError::invalid("epsilon", format!("yields invalid noise scale {scale}"))
    })?;
    info!(
        epsilon = params.epsilon,
        block_size = params.block_size,
        num_pixels = params.num_pixels,
        scale,
        "Applying DP pixelation"
    );

    let rgb = image.to_rgb8();
    let mut grid = block_means(&rgb, params.block_size);
    debug!(rows = grid.rows, cols = grid.cols, "Block means computed");

    for block in &mut grid.values {
        for channel in block.iter_mut() {
            *channel += laplace.sample(rng);
        }
    }

    let output = expand_blocks(&grid);
    debug!(
        out_w = output.width(),
        out_h = output.height(),
        "DP pixelation complete"
    );
    Ok(output)
}
