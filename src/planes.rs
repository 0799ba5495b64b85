// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes the relationship
//! between the pixel grid of a raster, with its origin at 0,0 in the
//! upper left, and a window onto the complex plane described by its
//! center and its width.  Pixels are square, so the height of the
//! window follows from the raster's aspect ratio.
use num::Complex;

/// Describes the x, y of a pixel in a raster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels to points on the complex plane and back.  Column `x`
/// and row `y` map to `origin + (x, y) · scale`, so the real part grows
/// to the right and the imaginary part grows downward.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// Columns of the raster.
    pub width: usize,
    /// Rows of the raster.
    pub height: usize,
    /// Complex-plane distance between neighbouring pixels.
    pub scale: f64,
    // The complex coordinate of pixel 0,0.
    origin: Complex<f64>,
}

impl PlaneMapper {
    /// Places a window `view_width` units wide, centered on `center`,
    /// over a `width` × `height` raster.  A zero width yields a mapper
    /// with a zero scale; callers are expected to skip empty rasters.
    pub fn new(width: usize, height: usize, center: Complex<f64>, view_width: f64) -> PlaneMapper {
        let scale = if width == 0 { 0.0 } else { view_width / width as f64 };
        let origin = Complex::new(
            center.re - width as f64 * 0.5 * scale,
            center.im - height as f64 * 0.5 * scale,
        );
        PlaneMapper {
            width,
            height,
            scale,
            origin,
        }
    }

    /// The total number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Height of the window in complex-plane units.
    pub fn view_height(&self) -> f64 {
        self.scale * self.height as f64
    }

    /// Given a pixel, find the point on the complex plane it samples.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.origin.re + pixel.0 as f64 * self.scale,
            self.origin.im + pixel.1 as f64 * self.scale,
        )
    }

    /// Given a point on the complex plane, find the pixel that
    /// samples it, or `None` if the point falls outside the raster.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        if self.scale == 0.0 {
            return None;
        }
        let left = ((point.re - self.origin.re) / self.scale).floor();
        let top = ((point.im - self.origin.im) / self.scale).floor();
        if left < 0.0 || top < 0.0 || left >= self.width as f64 || top >= self.height as f64 {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_lands_on_raster_center() {
        let pm = PlaneMapper::new(640, 480, Complex::new(-0.5, 0.25), 3.2);
        assert!((pm.scale - 0.005).abs() < 1e-15);
        let p = pm.pixel_to_point(&Pixel(320, 240));
        assert!((p.re + 0.5).abs() < 1e-12);
        assert!((p.im - 0.25).abs() < 1e-12);
    }

    #[test]
    fn view_height_follows_aspect() {
        let pm = PlaneMapper::new(400, 100, Complex::new(0.0, 0.0), 4.0);
        assert!((pm.view_height() - 1.0).abs() < 1e-12);
        assert_eq!(pm.len(), 40_000);
    }

    #[test]
    fn pixel_to_point_on_unit_grid() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 4.0);
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(3, 1)), Complex::new(1.0, -1.0));
    }

    #[test]
    fn point_to_pixel_on_unit_grid() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 4.0);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 0.0)), Some(Pixel(2, 2)));
        assert_eq!(pm.point_to_pixel(&Complex::new(-2.0, -2.0)), Some(Pixel(0, 0)));
        assert_eq!(pm.point_to_pixel(&Complex::new(1.5, -0.5)), Some(Pixel(3, 1)));
        assert_eq!(pm.point_to_pixel(&Complex::new(2.0, 0.0)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, -2.5)), None);
    }

    #[test]
    fn empty_planes() {
        assert!(PlaneMapper::new(0, 10, Complex::new(0.0, 0.0), 4.0).is_empty());
        assert!(PlaneMapper::new(10, 0, Complex::new(0.0, 0.0), 4.0).is_empty());
        let pm = PlaneMapper::new(0, 0, Complex::new(0.0, 0.0), 4.0);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 0.0)), None);
    }
}
