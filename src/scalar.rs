// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The scalar kernels: one pixel at a time, a plain loop with an early
//! return on escape.  These are the reference the vector kernels are
//! held to, and the fallback when the vector path is off.

use num::Complex;

use crate::lanes::Pair;
use crate::measure::{lyapunov, lyapunov_term, smooth, ESCAPE_RADIUS_SQ};
use crate::recurrence::{Kernel, Recurrence, StepVisitor};

/// What one pixel's iteration produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Trace {
    /// The smooth escape value; exactly the iteration cap for interior
    /// points.
    pub smooth: f64,
    /// The Lyapunov exponent, when the kernel was asked to track it.
    pub lyapunov: Option<f64>,
}

impl Trace {
    /// True if the point is colored as interior: it never escaped, or
    /// it escaped on the last iterations with a smooth value at or
    /// above the cap.  Exponents of three and up can do the latter.
    pub fn is_interior(&self, max_iter: u32) -> bool {
        self.smooth >= f64::from(max_iter)
    }
}

/// Iterates one point with a concrete update rule.
#[inline]
pub fn escape_with<R: Recurrence>(rule: R, kernel: &Kernel, point: Complex<f64>) -> Trace {
    let (mut z, c) = kernel.seed(Pair::new(point.re, point.im));
    let mut sum = 0.0;
    let mut terms = 0.0;

    for i in 0..kernel.max_iter {
        let squares = z.squares();
        let mag2 = squares.re + squares.im;
        if kernel.stability && mag2 > 0.0 {
            sum += lyapunov_term(mag2, &kernel.degree);
            terms += 1.0;
        }
        if mag2 > ESCAPE_RADIUS_SQ {
            return Trace {
                smooth: smooth(f64::from(i), mag2, &kernel.degree),
                lyapunov: lyapunov_if(kernel, sum, terms),
            };
        }
        z = rule.next(z, squares, c);
    }

    Trace {
        smooth: f64::from(kernel.max_iter),
        lyapunov: lyapunov_if(kernel, sum, terms),
    }
}

fn lyapunov_if(kernel: &Kernel, sum: f64, terms: f64) -> Option<f64> {
    if kernel.stability {
        Some(lyapunov(sum, terms))
    } else {
        None
    }
}

struct ScalarVisit<'a> {
    kernel: &'a Kernel,
    point: Complex<f64>,
}

impl<'a> StepVisitor for ScalarVisit<'a> {
    type Output = Trace;

    fn visit<R: Recurrence>(self, rule: R) -> Trace {
        escape_with(rule, self.kernel, self.point)
    }
}

/// Iterates one point, picking the update rule from the kernel.  For
/// whole rows prefer dispatching once and calling `escape_with`.
pub fn escape(kernel: &Kernel, point: Complex<f64>) -> Trace {
    kernel.step.dispatch(ScalarVisit { kernel, point })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, Formula, Seeding, ViewportConfig};

    fn kernel_for(formula: Formula, max_iter: u32) -> Kernel {
        let mut config = ViewportConfig::default();
        config.formula = formula;
        config.max_iter = max_iter;
        Kernel::from_config(&config)
    }

    #[test]
    fn origin_is_interior_exactly() {
        let kernel = kernel_for(Formula::Quadratic, 256);
        let trace = escape(&kernel, Complex::new(0.0, 0.0));
        assert_eq!(trace.smooth, 256.0);
        assert!(trace.is_interior(256));
        assert_eq!(trace.lyapunov, None);
    }

    #[test]
    fn one_escapes_quickly() {
        // 0 -> 1 -> 2 -> 5, |z|² = 25 after three steps.
        let kernel = kernel_for(Formula::Quadratic, 256);
        let trace = escape(&kernel, Complex::new(1.0, 0.0));
        assert!(trace.smooth > 2.0 && trace.smooth < 5.0, "{}", trace.smooth);
    }

    #[test]
    fn escape_value_does_not_depend_on_cap() {
        let point = Complex::new(-0.75, 0.1);
        let reference = escape(&kernel_for(Formula::Quadratic, 1000), point);
        assert!(!reference.is_interior(1000));
        let needed = reference.smooth.floor() as u32 + 2;
        for cap in needed..needed + 20 {
            let trace = escape(&kernel_for(Formula::Quadratic, cap), point);
            assert_eq!(trace.smooth, reference.smooth, "cap {}", cap);
        }
    }

    #[test]
    fn conjugate_is_symmetric_about_real_axis() {
        for &degree in &[2, 3, 5] {
            let kernel = kernel_for(Formula::Conjugate { degree }, 128);
            for &(x, y) in &[(-0.3, 0.6), (0.27, 0.45), (-1.1, 0.2), (0.4, 1.05)] {
                let above = escape(&kernel, Complex::new(x, y));
                let below = escape(&kernel, Complex::new(x, -y));
                assert_eq!(above.smooth, below.smooth, "degree {} at ({}, {})", degree, x, y);
            }
        }
    }

    #[test]
    fn real_power_starts_without_domain_error() {
        let kernel = kernel_for(Formula::RealPower { exponent: 2.5 }, 64);
        let trace = escape(&kernel, Complex::new(0.0, 0.0));
        assert_eq!(trace.smooth, 64.0);
        let trace = escape(&kernel, Complex::new(1.5, 0.5));
        assert!(trace.smooth.is_finite());
        assert!(trace.smooth < 64.0);
    }

    #[test]
    fn julia_seeding_uses_the_parameter() {
        let mut config = ViewportConfig::default();
        config.seeding = Seeding::Parameter;
        config.parameter = Complex::new(0.0, 0.0);
        config.max_iter = 50;
        let kernel = Kernel::from_config(&config);
        // With c = 0 the unit disk is the filled Julia set.
        assert_eq!(escape(&kernel, Complex::new(0.5, 0.5)).smooth, 50.0);
        assert!(escape(&kernel, Complex::new(1.2, 0.0)).smooth < 50.0);
    }

    #[test]
    fn lyapunov_is_negative_inside_a_cycle() {
        let mut config = ViewportConfig::default();
        config.color_mode = ColorMode::Stability;
        config.max_iter = 500;
        let kernel = Kernel::from_config(&config);
        let trace = escape(&kernel, Complex::new(-0.1, 0.1));
        let lambda = trace.lyapunov.unwrap_or(0.0);
        assert!(trace.is_interior(500));
        assert!(lambda < 0.0, "{}", lambda);
    }

    #[test]
    fn lyapunov_skips_zero_magnitude() {
        let mut config = ViewportConfig::default();
        config.color_mode = ColorMode::Stability;
        config.max_iter = 10;
        let kernel = Kernel::from_config(&config);
        // The orbit of c = 0 sits at zero; no term is ever accumulated.
        let trace = escape(&kernel, Complex::new(0.0, 0.0));
        assert_eq!(trace.lyapunov, Some(0.0));
    }
}
