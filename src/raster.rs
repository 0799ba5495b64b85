// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The caller-owned output grid and its export to disk.

use image::{DynamicImage, RgbaImage};
use std::path::Path;

use crate::errors::FractalError;
use crate::palette::{unpack, INTERIOR};
use crate::tiles::Tile;

/// A row-major grid of packed `0xAABBGGRR` colors.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Raster {
    /// An opaque black raster.
    pub fn new(width: usize, height: usize) -> Raster {
        Raster {
            width,
            height,
            pixels: vec![INTERIOR; width * height],
        }
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The pixel at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Changes the dimensions and clears to black.  Never called by
    /// the renderer; only the owner resizes.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, INTERIOR);
    }

    /// Copies a finished tile's colors, row-major within the tile, into
    /// place.
    pub fn blit(&mut self, tile: &Tile, colors: &[u32]) {
        if tile.width == 0 {
            return;
        }
        for (row, line) in colors.chunks(tile.width).take(tile.height).enumerate() {
            let start = (tile.y + row) * self.width + tile.x;
            self.pixels[start..start + line.len()].copy_from_slice(line);
        }
    }

    /// The pixels as R,G,B,A bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| unpack(c).to_vec()).collect()
    }

    /// Writes the raster to `path`; the format follows the extension.
    /// PNG keeps the alpha channel, other formats get RGB.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FractalError> {
        let path = path.as_ref();
        let export = |reason: String| FractalError::Export {
            path: path.display().to_string(),
            reason,
        };

        let buffer = RgbaImage::from_raw(self.width as u32, self.height as u32, self.to_rgba())
            .ok_or_else(|| export("pixel buffer does not match dimensions".to_string()))?;
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));

        let saved = if is_png {
            buffer.save(path)
        } else {
            DynamicImage::ImageRgba8(buffer).to_rgb().save(path)
        };
        saved.map_err(|e| export(e.to_string()))?;
        info!("wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_raster_is_black() {
        let raster = Raster::new(3, 2);
        assert_eq!(raster.pixels().len(), 6);
        assert!(raster.pixels().iter().all(|&c| c == INTERIOR));
        assert_eq!(raster.pixel(3, 0), None);
    }

    #[test]
    fn blit_lands_inside_tile() {
        let mut raster = Raster::new(4, 3);
        let tile = Tile {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        };
        raster.blit(&tile, &[1, 2, 3, 4]);
        assert_eq!(raster.pixel(1, 1), Some(1));
        assert_eq!(raster.pixel(2, 1), Some(2));
        assert_eq!(raster.pixel(1, 2), Some(3));
        assert_eq!(raster.pixel(2, 2), Some(4));
        assert_eq!(raster.pixel(0, 1), Some(INTERIOR));
        assert_eq!(raster.pixel(3, 2), Some(INTERIOR));
    }

    #[test]
    fn rgba_bytes_are_in_order() {
        let mut raster = Raster::new(1, 1);
        raster.blit(
            &Tile {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
            &[0xFF33_2211],
        );
        assert_eq!(raster.to_rgba(), vec![0x11, 0x22, 0x33, 0xFF]);
    }

    #[test]
    fn resize_clears() {
        let mut raster = Raster::new(2, 2);
        raster.resize(0, 5);
        assert!(raster.is_empty());
        raster.resize(5, 1);
        assert_eq!(raster.pixels().len(), 5);
    }
}
