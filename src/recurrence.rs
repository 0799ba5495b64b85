// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The update rules, written once.
//!
//! Each formula family is a small `Recurrence` strategy whose `next`
//! is generic over `Lane`, so the scalar kernels, the vector kernels
//! and the orbit tracer all step through exactly the same code.  A
//! `Step` is the resolved choice of strategy for one render; its
//! `dispatch` is the one place where a runtime formula turns into a
//! monomorphized kernel.

use num::{clamp, Complex};

use crate::config::{
    Formula, Rectify, RectifyStage, Seeding, ViewportConfig, MAX_INTEGER_EXPONENT,
    MIN_INTEGER_EXPONENT,
};
use crate::lanes::{Lane, Pair};
use crate::measure::Degree;

/// A real exponent this close to an integer in the supported range
/// runs on the repeated-multiplication kernel instead of the polar one.
pub const DEFAULT_PROMOTION_TOLERANCE: f64 = 1e-9;

/// One escape-time update rule, `z ← f(z) + c`.
pub trait Recurrence: Copy + Send + Sync + 'static {
    /// The exponent the smooth and Lyapunov formulas use.
    fn degree(&self) -> f64;

    /// Computes the next `z`.  `squares` is `(re², im²)` of `z`,
    /// already needed by the caller for the escape test.
    fn next<L: Lane>(&self, z: Pair<L>, squares: Pair<L>, c: Pair<L>) -> Pair<L>;
}

/// `z² + c`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quadratic;

impl Recurrence for Quadratic {
    fn degree(&self) -> f64 {
        2.0
    }

    #[inline]
    fn next<L: Lane>(&self, z: Pair<L>, squares: Pair<L>, c: Pair<L>) -> Pair<L> {
        Pair::new(squares.re - squares.im + c.re, (z.re + z.re) * z.im + c.im)
    }
}

impl Recurrence for Rectify {
    fn degree(&self) -> f64 {
        2.0
    }

    #[inline]
    fn next<L: Lane>(&self, z: Pair<L>, squares: Pair<L>, c: Pair<L>) -> Pair<L> {
        match self.stage {
            RectifyStage::Operands => {
                let a = if self.re { z.re.abs() } else { z.re };
                let b = if self.im { z.im.abs() } else { z.im };
                Pair::new(squares.re - squares.im + c.re, (a + a) * b + c.im)
            }
            RectifyStage::Squares => {
                let re = squares.re - squares.im;
                let im = (z.re + z.re) * z.im;
                let re = if self.re { re.abs() } else { re };
                let im = if self.im { im.abs() } else { im };
                Pair::new(re + c.re, im + c.im)
            }
        }
    }
}

/// `zⁿ + c`, or `conj(z)ⁿ + c`, by `n − 1` complex multiplications.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntegerPower {
    /// The exponent, at least 2.
    pub exponent: u32,
    /// Negate the imaginary part of the power.
    pub conjugate: bool,
}

impl Recurrence for IntegerPower {
    fn degree(&self) -> f64 {
        f64::from(self.exponent)
    }

    #[inline]
    fn next<L: Lane>(&self, z: Pair<L>, _squares: Pair<L>, c: Pair<L>) -> Pair<L> {
        let mut power = z;
        for _ in 1..self.exponent {
            power = Pair::new(
                power.re * z.re - power.im * z.im,
                power.re * z.im + power.im * z.re,
            );
        }
        let im = if self.conjugate { -power.im } else { power.im };
        Pair::new(power.re + c.re, im + c.im)
    }
}

/// `zⁿ + c` for a real exponent, through the polar form.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RealPower {
    /// The exponent.
    pub exponent: f64,
}

impl Recurrence for RealPower {
    fn degree(&self) -> f64 {
        self.exponent
    }

    #[inline]
    fn next<L: Lane>(&self, z: Pair<L>, _squares: Pair<L>, c: Pair<L>) -> Pair<L> {
        let power = L::polar_pow(z, self.exponent);
        Pair::new(power.re + c.re, power.im + c.im)
    }
}

/// Code that is generic over the update rule.  `Step::dispatch`
/// picks the rule and calls `visit` with it.
pub trait StepVisitor {
    /// Whatever the visitor produces.
    type Output;

    /// Runs with a concrete rule.
    fn visit<R: Recurrence>(self, recurrence: R) -> Self::Output;
}

/// The update rule chosen for one render pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step {
    /// Plain quadratic.
    Quadratic,
    /// Quadratic with rectified components.
    Rectified(Rectify),
    /// Integer power, possibly conjugated.
    Power(IntegerPower),
    /// Real power via the polar form.
    Polar(RealPower),
}

impl Step {
    /// Resolves a formula into the rule that will run.  Integer
    /// exponents are clamped into the supported range, exponent 2
    /// collapses onto the quadratic, and a real exponent within
    /// `tolerance` of a supported integer is promoted to the integer
    /// rule.
    pub fn resolve(formula: &Formula, tolerance: f64) -> Step {
        match *formula {
            Formula::Quadratic => Step::Quadratic,
            Formula::AbsoluteValue(rectify) if rectify.is_identity() => Step::Quadratic,
            Formula::AbsoluteValue(rectify) => Step::Rectified(rectify),
            Formula::Conjugate { degree } => Step::Power(IntegerPower {
                exponent: clamp(degree, MIN_INTEGER_EXPONENT, MAX_INTEGER_EXPONENT),
                conjugate: true,
            }),
            Formula::IntegerPower { exponent } => {
                Step::integer(clamp(exponent, MIN_INTEGER_EXPONENT, MAX_INTEGER_EXPONENT))
            }
            Formula::RealPower { exponent } => match promote(exponent, tolerance) {
                Some(n) => {
                    debug!("real exponent {} runs as integer exponent {}", exponent, n);
                    Step::integer(n)
                }
                None => Step::Polar(RealPower { exponent }),
            },
        }
    }

    fn integer(exponent: u32) -> Step {
        if exponent == 2 {
            Step::Quadratic
        } else {
            Step::Power(IntegerPower {
                exponent,
                conjugate: false,
            })
        }
    }

    /// The exponent of the chosen rule.
    pub fn degree(&self) -> f64 {
        match *self {
            Step::Quadratic => Quadratic.degree(),
            Step::Rectified(ref r) => r.degree(),
            Step::Power(ref p) => p.degree(),
            Step::Polar(ref p) => p.degree(),
        }
    }

    /// Hands the concrete rule to `visitor`.
    pub fn dispatch<V: StepVisitor>(&self, visitor: V) -> V::Output {
        match *self {
            Step::Quadratic => visitor.visit(Quadratic),
            Step::Rectified(r) => visitor.visit(r),
            Step::Power(p) => visitor.visit(p),
            Step::Polar(p) => visitor.visit(p),
        }
    }
}

/// The integer a real exponent stands for, if it is within
/// `tolerance` of one the integer kernels support.
pub fn promote(exponent: f64, tolerance: f64) -> Option<u32> {
    let n = exponent.round();
    let supported = n >= f64::from(MIN_INTEGER_EXPONENT) && n <= f64::from(MAX_INTEGER_EXPONENT);
    if supported && (exponent - n).abs() < tolerance {
        Some(n as u32)
    } else {
        None
    }
}

/// Everything a kernel needs for one render pass, resolved once from
/// the `ViewportConfig` and copied into every tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Kernel {
    /// The update rule.
    pub step: Step,
    /// Exponent-derived constants for smoothing and Lyapunov.
    pub degree: Degree,
    /// Mandelbrot-style or Julia-style.
    pub seeding: Seeding,
    /// `c` in parameter-seeded mode.
    pub parameter: Complex<f64>,
    /// Iteration cap.
    pub max_iter: u32,
    /// Accumulate the Lyapunov exponent as well.
    pub stability: bool,
}

impl Kernel {
    /// Resolves `config`, promoting real exponents within `tolerance`.
    pub fn new(config: &ViewportConfig, tolerance: f64) -> Kernel {
        let step = Step::resolve(&config.formula, tolerance);
        Kernel {
            step,
            degree: Degree::new(step.degree()),
            seeding: config.seeding,
            parameter: config.parameter,
            max_iter: config.max_iter,
            stability: config.color_mode.needs_stability(),
        }
    }

    /// Resolves `config` with the default promotion tolerance.
    pub fn from_config(config: &ViewportConfig) -> Kernel {
        Kernel::new(config, DEFAULT_PROMOTION_TOLERANCE)
    }

    /// The starting `z` and the constant `c` for a pixel at `point`.
    #[inline]
    pub fn seed<L: Lane>(&self, point: Pair<L>) -> (Pair<L>, Pair<L>) {
        match self.seeding {
            Seeding::Origin => (Pair::new(L::splat(0.0), L::splat(0.0)), point),
            Seeding::Parameter => (
                point,
                Pair::new(L::splat(self.parameter.re), L::splat(self.parameter.im)),
            ),
        }
    }
}
