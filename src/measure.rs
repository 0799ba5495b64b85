// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Post-processing of an iteration trace into the two numbers we
//! color by: the smooth (normalized) escape count and the Lyapunov
//! exponent.  Both are written against `Lane` so the scalar and the
//! vector kernels share them verbatim.

use crate::lanes::Lane;

/// A point escapes at the first iteration where `|z|²` exceeds this.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Logarithm arguments are clamped to at least this.
pub const LOG_FLOOR: f64 = 1e-300;

/// Constants derived from a formula's exponent, computed once per
/// render instead of once per pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Degree {
    /// The exponent itself.
    pub n: f64,
    inv_log_base: f64,
    log_n: f64,
    half_n_minus_one: f64,
}

impl Degree {
    /// Precomputes the logarithms for exponent `n`.  Smoothing needs
    /// a base above one; exponents with `|n| <= 1` smooth in base 2.
    pub fn new(n: f64) -> Degree {
        let base = if n.abs() > 1.0 { n.abs() } else { 2.0 };
        Degree {
            n,
            inv_log_base: 1.0 / base.ln(),
            log_n: n.abs().max(LOG_FLOOR).ln(),
            half_n_minus_one: (n - 1.0) * 0.5,
        }
    }
}

/// `i + 1 − log(log|z| / log n) / log n`, floored at zero, where
/// `completed` is the number of iterations finished before the escape
/// and `final_mag2` is `|z|²` at the escape.
#[inline]
pub fn smooth<L: Lane>(completed: L, final_mag2: L, degree: &Degree) -> L {
    let floor = L::splat(LOG_FLOOR);
    let inv_log_base = L::splat(degree.inv_log_base);
    let log_zn = final_mag2.max(floor).ln() * L::splat(0.5);
    let nu = (log_zn * inv_log_base).max(floor).ln() * inv_log_base;
    (completed + L::splat(1.0) - nu).max(L::splat(0.0))
}

/// `log|f'(z)| = log n + (n−1)/2 · log|z|²` for `f(z) = zⁿ + c`.
#[inline]
pub fn lyapunov_term<L: Lane>(mag2: L, degree: &Degree) -> L {
    let log_mag2 = mag2.max(L::splat(LOG_FLOOR)).ln();
    L::splat(degree.log_n) + L::splat(degree.half_n_minus_one) * log_mag2
}

/// The average of the accumulated terms; a trace with no terms
/// averages to zero.
#[inline]
pub fn lyapunov<L: Lane>(sum: L, terms: L) -> L {
    sum / terms.max(L::splat(1.0))
}
