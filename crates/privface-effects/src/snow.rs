// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DP Snow — stochastic channel corruption. A random fraction of pixel
// positions is overwritten with a fixed marker in three channel-isolated
// copies of the image, which are then averaged back together.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::map::{as_blue_channel, as_green_channel, as_red_channel};
use imageproc::map::{blue_channel, green_channel, red_channel};
use privface_core::{PrivfaceError, Result, SNOW_MARKER, SnowParams};
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::canvas::to_canonical_rgb;

/// Apply DP Snow to a colour image.
///
/// The image is resized to the canonical square, `floor(delta · N)` distinct
/// positions are drawn uniformly without replacement, and every drawn
/// position is set to `SNOW_MARKER` in the matching channel of its isolated
/// copy. The three copies are normalised, averaged, and rescaled to 8 bits.
///
/// Grayscale inputs are rejected with [`PrivfaceError::UnsupportedInput`].
#[instrument(skip(image, rng), fields(width = image.width(), height = image.height()))]
pub fn dp_snow<R: Rng + ?Sized>(
    image: &DynamicImage,
    params: &SnowParams,
    rng: &mut R,
) -> Result<RgbImage> {
    params.validate()?;
    if !image.color().has_color() {
        return Err(PrivfaceError::UnsupportedInput(format!(
            "DP Snow needs a colour image, got {:?}",
            image.color()
        )));
    }

    let canvas = to_canonical_rgb(image)?;
    let (width, height) = canvas.dimensions();
    let marked = select_marked_positions(rng, (width * height) as usize, params.delta);
    info!(delta = params.delta, marked = marked.len(), "Applying DP snow");

    let mut layers = isolate_channels(&canvas);
    for &index in &marked {
        let (x, y) = decode_position(index, width);
        for (channel, layer) in layers.iter_mut().enumerate() {
            layer.get_pixel_mut(x, y).0[channel] = SNOW_MARKER;
        }
    }

    let output = blend_layers(&layers);
    debug!("DP snow complete");
    Ok(output)
}

/// Draw `floor(delta · total)` distinct flat indices from `0..total`.
pub fn select_marked_positions<R: Rng + ?Sized>(
    rng: &mut R,
    total: usize,
    delta: f64,
) -> Vec<usize> {
    let amount = ((delta * total as f64).floor() as usize).min(total);
    rand::seq::index::sample(rng, total, amount).into_vec()
}

/// Map a flat row-major index to `(x, y)` pixel coordinates.
///
/// `x` is the column and `y` the row, matching `image`'s `get_pixel(x, y)`.
pub fn decode_position(index: usize, width: u32) -> (u32, u32) {
    let width = width as usize;
    ((index % width) as u32, (index / width) as u32)
}

/// Red-only, green-only and blue-only copies of `image`, in that order.
pub fn isolate_channels(image: &RgbImage) -> [RgbImage; 3] {
    [
        as_red_channel(&red_channel(image)),
        as_green_channel(&green_channel(image)),
        as_blue_channel(&blue_channel(image)),
    ]
}

/// Average the layers in unit range and rescale to 8 bits.
pub fn blend_layers(layers: &[RgbImage; 3]) -> RgbImage {
    let (width, height) = layers[0].dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let mut sum = [0.0_f64; 3];
        for layer in layers {
            for (acc, v) in sum.iter_mut().zip(layer.get_pixel(x, y).0) {
                *acc += f64::from(v) / 255.0;
            }
        }
        Rgb(sum.map(|s| (s / 3.0 * 255.0).round().clamp(0.0, 255.0) as u8))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use privface_core::CANONICAL_SIZE;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn photo() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(300, 180, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 200])
        }))
    }

    #[test]
    fn output_is_always_canonical() {
        let mut rng = StdRng::seed_from_u64(1);
        for delta in [0.0, 0.3, 1.0] {
            let out = dp_snow(&photo(), &SnowParams { delta }, &mut rng).unwrap();
            assert_eq!(out.dimensions(), (CANONICAL_SIZE, CANONICAL_SIZE));
        }
    }

    #[test]
    fn marked_count_is_exact_and_distinct() {
        let total = (CANONICAL_SIZE * CANONICAL_SIZE) as usize;
        let mut rng = StdRng::seed_from_u64(2);
        for delta in [0.0, 0.01, 0.5, 0.999, 1.0] {
            let marked = select_marked_positions(&mut rng, total, delta);
            assert_eq!(marked.len(), (delta * total as f64).floor() as usize);
            let unique: HashSet<_> = marked.iter().collect();
            assert_eq!(unique.len(), marked.len());
            assert!(marked.iter().all(|&i| i < total));
        }
    }

    #[test]
    fn decode_is_row_major() {
        assert_eq!(decode_position(0, 224), (0, 0));
        assert_eq!(decode_position(223, 224), (223, 0));
        assert_eq!(decode_position(224, 224), (0, 1));
        assert_eq!(decode_position(5 * 224 + 7, 224), (7, 5));
    }

    /// Every position is marked, so each channel ends up at 127 / 3.
    #[test]
    fn full_delta_marks_every_position() {
        let out = dp_snow(&photo(), &SnowParams { delta: 1.0 }, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(out.pixels().all(|p| p.0 == [42, 42, 42]));
    }

    /// With nothing marked the output is the channel-averaged canvas.
    #[test]
    fn zero_delta_is_channel_averaged_baseline() {
        let image = photo();
        let out = dp_snow(&image, &SnowParams { delta: 0.0 }, &mut StdRng::seed_from_u64(4)).unwrap();
        let canvas = to_canonical_rgb(&image).unwrap();
        for (o, c) in out.pixels().zip(canvas.pixels()) {
            for ch in 0..3 {
                let expected = (f64::from(c.0[ch]) / 3.0).round() as u8;
                assert_eq!(o.0[ch], expected);
            }
        }
    }

    #[test]
    fn isolated_copies_keep_one_channel() {
        let image = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        let [r, g, b] = isolate_channels(&image);
        assert_eq!(r.get_pixel(0, 0).0, [10, 0, 0]);
        assert_eq!(g.get_pixel(1, 0).0, [0, 20, 0]);
        assert_eq!(b.get_pixel(1, 1).0, [0, 0, 30]);
    }

    #[test]
    fn grayscale_input_is_unsupported() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([128u8])));
        let err = dp_snow(&image, &SnowParams { delta: 0.5 }, &mut StdRng::seed_from_u64(5)).unwrap_err();
        assert!(matches!(err, PrivfaceError::UnsupportedInput(_)));
    }

    #[test]
    fn out_of_range_delta_is_rejected() {
        let err = dp_snow(&photo(), &SnowParams { delta: 1.5 }, &mut StdRng::seed_from_u64(6)).unwrap_err();
        assert!(matches!(err, PrivfaceError::InvalidParameter { name: "delta", .. }));
    }
}
