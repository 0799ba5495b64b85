// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The arithmetic the kernels are written against.  A `Lane` is
//! either a single `f64` (the scalar kernels, the orbit tracer) or a
//! `wide::f64x4` carrying four horizontally adjacent pixels (the
//! vector kernels).  Every update rule is written once, generically,
//! against this trait, so the scalar and vector paths perform the
//! same IEEE operations in the same order and their orbits agree bit
//! for bit.

use std::ops::{Add, Div, Mul, Neg, Sub};
use wide::*;

/// A number, or a fixed-width pack of numbers, the kernels iterate on.
pub trait Lane:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// How many pixels one value carries.
    const WIDTH: usize;

    /// The same value in every lane.
    fn splat(value: f64) -> Self;

    /// Lane-wise absolute value.
    fn abs(self) -> Self;

    /// Lane-wise natural logarithm.
    fn ln(self) -> Self;

    /// Lane-wise maximum.
    fn max(self, other: Self) -> Self;

    /// `zⁿ` through the polar form, with `0ⁿ = 0`.
    fn polar_pow(z: Pair<Self>, n: f64) -> Pair<Self>;
}

/// A complex number, or a pack of them, split into components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pair<L> {
    /// Real component(s).
    pub re: L,
    /// Imaginary component(s).
    pub im: L,
}

impl<L: Lane> Pair<L> {
    /// Builds a pair from its components.
    pub fn new(re: L, im: L) -> Self {
        Pair { re, im }
    }

    /// `(re², im²)`, which every kernel needs for the escape test.
    pub fn squares(&self) -> Pair<L> {
        Pair::new(self.re * self.re, self.im * self.im)
    }
}

/// `zⁿ = |z|ⁿ·(cos nθ + i sin nθ)` for one complex number.  The
/// origin is special-cased to zero so the next step lands exactly on
/// `c`.
pub fn polar_pow(re: f64, im: f64, n: f64) -> (f64, f64) {
    let mag2 = re * re + im * im;
    if mag2 == 0.0 {
        return (0.0, 0.0);
    }
    let r_n = (0.5 * n * mag2.ln()).exp();
    let (sin, cos) = (n * im.atan2(re)).sin_cos();
    (r_n * cos, r_n * sin)
}

impl Lane for f64 {
    const WIDTH: usize = 1;

    #[inline]
    fn splat(value: f64) -> Self {
        value
    }

    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }

    #[inline]
    fn polar_pow(z: Pair<Self>, n: f64) -> Pair<Self> {
        let (re, im) = polar_pow(z.re, z.im, n);
        Pair::new(re, im)
    }
}

impl Lane for f64x4 {
    const WIDTH: usize = 4;

    #[inline]
    fn splat(value: f64) -> Self {
        f64x4::splat(value)
    }

    #[inline]
    fn abs(self) -> Self {
        f64x4::abs(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64x4::ln(self)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f64x4::max(self, other)
    }

    // The transcendental step is taken lane by lane with the scalar
    // routine; a vector atan2/sin_cos rounds differently and the
    // orbits would drift apart from the scalar kernel near the
    // boundary.
    #[inline]
    fn polar_pow(z: Pair<Self>, n: f64) -> Pair<Self> {
        let (re, im) = (z.re.to_array(), z.im.to_array());
        let mut out_re = [0.0; 4];
        let mut out_im = [0.0; 4];
        for k in 0..4 {
            let (r, i) = polar_pow(re[k], im[k], n);
            out_re[k] = r;
            out_im[k] = i;
        }
        Pair::new(f64x4::from(out_re), f64x4::from(out_im))
    }
}
