// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Block statistics — per-block channel means over a cropped RGB grid and the
// inverse expansion back to pixel resolution.

use image::{Rgb, RgbImage};

/// Reduced grid of per-block channel means, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGrid {
    /// Number of block rows.
    pub rows: u32,
    /// Number of block columns.
    pub cols: u32,
    /// Side length of each block in pixels.
    pub block_size: u32,
    /// One `[r, g, b]` mean per block, indexed `row * cols + col`.
    pub values: Vec<[f64; 3]>,
}

impl BlockGrid {
    pub fn get(&self, row: u32, col: u32) -> [f64; 3] {
        self.values[(row * self.cols + col) as usize]
    }

    /// Pixel dimensions `(width, height)` covered by the grid.
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        (self.cols * self.block_size, self.rows * self.block_size)
    }
}

/// Average every `block_size`×`block_size` block of `image`.
///
/// Trailing rows and columns that do not fill a whole block are ignored,
/// which is equivalent to cropping down to the nearest multiple first.
pub fn block_means(image: &RgbImage, block_size: u32) -> BlockGrid {
    let rows = image.height() / block_size;
    let cols = image.width() / block_size;
    let area = f64::from(block_size) * f64::from(block_size);

    let mut values = Vec::with_capacity((rows * cols) as usize);
    for i in 0..rows {
        for j in 0..cols {
            let mut sum = [0.0_f64; 3];
            for y in i * block_size..(i + 1) * block_size {
                for x in j * block_size..(j + 1) * block_size {
                    let Rgb(px) = *image.get_pixel(x, y);
                    for (acc, v) in sum.iter_mut().zip(px) {
                        *acc += f64::from(v);
                    }
                }
            }
            values.push(sum.map(|s| s / area));
        }
    }

    BlockGrid {
        rows,
        cols,
        block_size,
        values,
    }
}

/// Paint every block's value across its pixels.
///
/// Values are clamped to `[0, 255]` and rounded before narrowing, so noisy
/// means never wrap around.
pub fn expand_blocks(grid: &BlockGrid) -> RgbImage {
    let (width, height) = grid.pixel_dimensions();
    let b = grid.block_size;
    RgbImage::from_fn(width, height, |x, y| {
        let value = grid.get(y / b, x / b);
        Rgb(value.map(to_u8))
    })
}

fn to_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn means_of_known_blocks() {
        // 4x2 image, block size 2: left block has 0 and 100, right block 200.
        let image = RgbImage::from_fn(4, 2, |x, y| {
            if x < 2 {
                Rgb([if y == 0 { 0 } else { 100 }, 10, 20])
            } else {
                Rgb([200, 200, 200])
            }
        });
        let grid = block_means(&image, 2);
        assert_eq!((grid.rows, grid.cols), (1, 2));
        assert_eq!(grid.get(0, 0), [50.0, 10.0, 20.0]);
        assert_eq!(grid.get(0, 1), [200.0, 200.0, 200.0]);
    }

    #[test]
    fn remainder_is_cropped() {
        let image = RgbImage::from_pixel(10, 7, Rgb([9, 9, 9]));
        let grid = block_means(&image, 3);
        assert_eq!((grid.rows, grid.cols), (2, 3));
        assert_eq!(grid.pixel_dimensions(), (9, 6));
    }

    #[test]
    fn expand_clamps_out_of_range_values() {
        let grid = BlockGrid {
            rows: 1,
            cols: 2,
            block_size: 2,
            values: vec![[-40.0, 300.0, 127.6], [0.4, 254.5, 1e9]],
        };
        let image = expand_blocks(&grid);
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(*image.get_pixel(1, 1), Rgb([0, 255, 128]));
        assert_eq!(*image.get_pixel(3, 0), Rgb([0, 255, 255]));
    }
}
