// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cutting a raster into independently schedulable rectangles.

use itertools::iproduct;

/// Edge length of a tile unless the renderer is told otherwise.
pub const DEFAULT_TILE_SIZE: usize = 64;

/// A rectangle of pixels, clipped to the raster it was cut from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Columns covered.
    pub width: usize,
    /// Rows covered.
    pub height: usize,
}

impl Tile {
    /// Pixels covered.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True for a tile that covers nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions a `width` × `height` raster into `size` × `size` tiles,
/// row by row.  Tiles in the last row and column are clipped.  A size
/// of zero is treated as one.
pub fn tiles(width: usize, height: usize, size: usize) -> Vec<Tile> {
    let size = size.max(1);
    iproduct!((0..height).step_by(size), (0..width).step_by(size))
        .map(|(y, x)| Tile {
            x,
            y,
            width: size.min(width - x),
            height: size.min(height - y),
        })
        .collect()
}
