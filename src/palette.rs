// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Color lookup.  A `PaletteSet` is built once, before any render, and
//! is only ever read afterwards; the renderer shares it between tile
//! tasks behind an `Arc`.  Colors are packed `0xAABBGGRR`, which is
//! R,G,B,A byte order in memory on little-endian machines.

use num::clamp;

/// Entries per palette.
pub const LUT_SIZE: usize = 1024;

/// The packed color of interior (never-escaping) pixels.
pub const INTERIOR: u32 = 0xFF00_0000;

/// Palette steps per unit of smooth escape value.
pub const SMOOTH_SCALE: f64 = 40.0;

/// Palette steps per unit of Lyapunov exponent.
pub const STABILITY_SCALE: f64 = 200.0;

/// A point on a gradient: position in `[0, 1]` and an RGB color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorStop(pub f64, pub u8, pub u8, pub u8);

/// Packs an opaque color.
pub fn pack(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (u32::from(b) << 16) | (u32::from(g) << 8) | u32::from(r)
}

/// Splits a packed color into `[r, g, b, a]`.
pub fn unpack(color: u32) -> [u8; 4] {
    [
        color as u8,
        (color >> 8) as u8,
        (color >> 16) as u8,
        (color >> 24) as u8,
    ]
}

/// A named lookup table.
#[derive(Clone, Debug)]
pub struct Palette {
    /// Display name.
    pub name: &'static str,
    table: Vec<u32>,
}

impl Palette {
    /// Linearly interpolates `stops` across `LUT_SIZE` entries.  The
    /// stops must be sorted by position; fewer than two stops give a
    /// flat palette.
    pub fn from_stops(name: &'static str, stops: &[ColorStop]) -> Palette {
        let table = (0..LUT_SIZE)
            .map(|i| {
                let t = i as f64 / (LUT_SIZE - 1) as f64;
                match stops.len() {
                    0 => INTERIOR,
                    1 => pack(stops[0].1, stops[0].2, stops[0].3),
                    n => {
                        let seg = (0..n - 1).find(|&s| t <= stops[s + 1].0).unwrap_or(n - 2);
                        let (a, b) = (stops[seg], stops[seg + 1]);
                        let span = b.0 - a.0;
                        let f = if span > 0.0 { clamp((t - a.0) / span, 0.0, 1.0) } else { 0.0 };
                        let mix = |x: u8, y: u8| (f64::from(x) + f * (f64::from(y) - f64::from(x))) as u8;
                        pack(mix(a.1, b.1), mix(a.2, b.2), mix(a.3, b.3))
                    }
                }
            })
            .collect();
        Palette { name, table }
    }

    /// `bands` alternating black and white stripes.
    pub fn banded(name: &'static str, bands: usize) -> Palette {
        let width = (LUT_SIZE / bands.max(1)).max(1);
        let table = (0..LUT_SIZE)
            .map(|i| if (i / width) % 2 == 0 { INTERIOR } else { 0xFFFF_FFFF })
            .collect();
        Palette { name, table }
    }

    /// The entry at `index`, wrapped into the table.
    pub fn at(&self, index: i64) -> u32 {
        self.table[index.rem_euclid(LUT_SIZE as i64) as usize]
    }
}

/// Every palette the renderer can color with.
#[derive(Clone, Debug)]
pub struct PaletteSet {
    palettes: Vec<Palette>,
}

impl PaletteSet {
    /// Wraps a list of palettes.  An empty list gets a grayscale ramp
    /// so lookups always have something to read.
    pub fn new(mut palettes: Vec<Palette>) -> PaletteSet {
        if palettes.is_empty() {
            palettes.push(grayscale());
        }
        PaletteSet { palettes }
    }

    /// The eight stock palettes.
    pub fn standard() -> PaletteSet {
        PaletteSet::new(vec![
            grayscale(),
            Palette::from_stops(
                "Fire",
                &[
                    ColorStop(0.000, 0, 0, 0),
                    ColorStop(0.250, 128, 0, 0),
                    ColorStop(0.500, 255, 0, 0),
                    ColorStop(0.750, 255, 128, 0),
                    ColorStop(0.875, 255, 255, 0),
                    ColorStop(1.000, 255, 255, 255),
                ],
            ),
            Palette::from_stops(
                "Ice",
                &[
                    ColorStop(0.00, 0, 0, 0),
                    ColorStop(0.25, 0, 0, 128),
                    ColorStop(0.50, 0, 64, 255),
                    ColorStop(0.75, 0, 200, 255),
                    ColorStop(1.00, 255, 255, 255),
                ],
            ),
            Palette::from_stops(
                "Electric",
                &[
                    ColorStop(0.00, 0, 0, 0),
                    ColorStop(0.25, 64, 0, 128),
                    ColorStop(0.50, 0, 64, 255),
                    ColorStop(0.75, 0, 200, 255),
                    ColorStop(1.00, 255, 255, 255),
                ],
            ),
            Palette::from_stops(
                "Sunset",
                &[
                    ColorStop(0.00, 0, 0, 0),
                    ColorStop(0.30, 128, 0, 32),
                    ColorStop(0.55, 255, 64, 0),
                    ColorStop(0.80, 255, 200, 0),
                    ColorStop(1.00, 255, 255, 180),
                ],
            ),
            Palette::from_stops(
                "Forest",
                &[
                    ColorStop(0.00, 0, 0, 0),
                    ColorStop(0.25, 0, 64, 0),
                    ColorStop(0.50, 0, 160, 0),
                    ColorStop(0.75, 100, 220, 0),
                    ColorStop(1.00, 200, 255, 180),
                ],
            ),
            Palette::banded("Zebra", 8),
            Palette::from_stops(
                "Classic Ultra",
                &[
                    ColorStop(0.0000, 0, 7, 100),
                    ColorStop(0.1600, 32, 107, 203),
                    ColorStop(0.4200, 237, 255, 255),
                    ColorStop(0.6425, 255, 170, 0),
                    ColorStop(0.8575, 0, 2, 0),
                    ColorStop(1.0000, 0, 7, 100),
                ],
            ),
        ])
    }

    /// Number of palettes.
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    /// Never true; see `new`.
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// The palette names, in index order.
    pub fn names(&self) -> Vec<&'static str> {
        self.palettes.iter().map(|p| p.name).collect()
    }

    /// Looks a palette up by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.palettes
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    fn palette(&self, id: usize) -> &Palette {
        &self.palettes[id % self.palettes.len()]
    }

    /// Colors a smooth escape value.  Values at or above the cap are
    /// interior and come out black.
    pub fn color_for_smooth(&self, value: f64, cap: u32, palette: usize, offset: i32) -> u32 {
        if value >= f64::from(cap) {
            return INTERIOR;
        }
        let index = (value * SMOOTH_SCALE) as i64 + i64::from(offset);
        self.palette(palette).at(index)
    }

    /// Colors a Lyapunov exponent.  Negative exponents wrap around to
    /// the top of the table.
    pub fn color_for_stability(&self, lambda: f64, palette: usize, offset: i32) -> u32 {
        let index = (lambda * STABILITY_SCALE) as i64 + i64::from(offset);
        self.palette(palette).at(index)
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        PaletteSet::standard()
    }
}

fn grayscale() -> Palette {
    Palette::from_stops(
        "Grayscale",
        &[ColorStop(0.0, 0, 0, 0), ColorStop(1.0, 255, 255, 255)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_has_eight_palettes() {
        let set = PaletteSet::standard();
        assert_eq!(set.len(), 8);
        assert_eq!(set.names()[7], "Classic Ultra");
        assert_eq!(set.find("zebra"), Some(6));
        assert_eq!(set.find("plaid"), None);
    }

    #[test]
    fn grayscale_runs_black_to_white() {
        let set = PaletteSet::standard();
        assert_eq!(set.color_for_smooth(0.0, 100, 0, 0), pack(0, 0, 0));
        assert_eq!(unpack(set.palettes[0].at(LUT_SIZE as i64 - 1)), [255, 255, 255, 255]);
    }

    #[test]
    fn interior_is_black() {
        let set = PaletteSet::standard();
        for palette in 0..set.len() {
            assert_eq!(set.color_for_smooth(256.0, 256, palette, 17), INTERIOR);
        }
    }

    #[test]
    fn lookups_wrap_in_both_directions() {
        let set = PaletteSet::standard();
        let gray = &set.palettes[0];
        assert_eq!(set.color_for_smooth(1.0, 100, 0, -40), gray.at(0));
        assert_eq!(set.color_for_smooth(1.0, 100, 0, LUT_SIZE as i32), gray.at(40));
        assert_eq!(set.color_for_stability(-0.005, 0, 0), gray.at(-1));
        assert_eq!(gray.at(-1), gray.at(LUT_SIZE as i64 - 1));
    }

    #[test]
    fn palette_ids_wrap() {
        let set = PaletteSet::standard();
        assert_eq!(
            set.color_for_stability(0.3, 9, 0),
            set.color_for_stability(0.3, 1, 0)
        );
    }

    #[test]
    fn zebra_alternates() {
        let zebra = Palette::banded("Zebra", 8);
        assert_eq!(zebra.at(0), INTERIOR);
        assert_eq!(zebra.at(128), 0xFFFF_FFFF);
        assert_eq!(zebra.at(256), INTERIOR);
    }

    #[test]
    fn every_entry_is_opaque() {
        let set = PaletteSet::standard();
        for palette in set.palettes.iter() {
            assert!(palette.table.iter().all(|c| c >> 24 == 0xFF), "{}", palette.name);
        }
    }
}
