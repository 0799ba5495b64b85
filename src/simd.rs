// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The vector kernels.  Four horizontally adjacent pixels ride in one
//! `f64x4` and iterate in lockstep.  Lanes cannot branch on their own,
//! so every lane computes the next `z` on every pass and a mask decides
//! whether that candidate is kept.  A lane that escapes keeps the `z`,
//! `|z|²` and iteration count it had at that moment while its
//! neighbours carry on.
//!
//! The update rules and the smoothing math are the same generic code
//! the scalar kernels run, so the two paths agree to within the
//! rounding of the logarithms.

use num::Complex;
use wide::*;

use crate::lanes::Pair;
use crate::measure::{lyapunov, lyapunov_term, smooth, ESCAPE_RADIUS_SQ};
use crate::recurrence::{Kernel, Recurrence, StepVisitor};
use crate::scalar::Trace;

/// Pixels per vector kernel call.
pub const LANES: usize = 4;

/// Iterates four points at once with a concrete update rule.
pub fn escape4_with<R: Recurrence>(
    rule: R,
    kernel: &Kernel,
    points: &[Complex<f64>; LANES],
) -> [Trace; LANES] {
    let point = Pair::new(
        f64x4::from([points[0].re, points[1].re, points[2].re, points[3].re]),
        f64x4::from([points[0].im, points[1].im, points[2].im, points[3].im]),
    );
    let (mut z, c) = kernel.seed(point);

    let zero = f64x4::splat(0.0);
    let one = f64x4::splat(1.0);
    let radius = f64x4::splat(ESCAPE_RADIUS_SQ);

    let mut active = one.cmp_eq(one);
    let mut completed = zero;
    let mut final_mag2 = radius;
    let mut sum = zero;
    let mut terms = zero;

    for _ in 0..kernel.max_iter {
        let squares = z.squares();
        let mag2 = squares.re + squares.im;

        if kernel.stability {
            let counted = active & mag2.cmp_gt(zero);
            sum = sum + (counted & lyapunov_term(mag2, &kernel.degree));
            terms = terms + (counted & one);
        }

        let escaped = active & mag2.cmp_gt(radius);
        final_mag2 = escaped.blend(mag2, final_mag2);
        active = escaped.blend(zero, active);
        if active.move_mask() == 0 {
            break;
        }

        let next = rule.next(z, squares, c);
        z = Pair::new(active.blend(next.re, z.re), active.blend(next.im, z.im));
        completed = completed + (active & one);
    }

    let cap = f64x4::splat(f64::from(kernel.max_iter));
    let values = active
        .blend(cap, smooth(completed, final_mag2, &kernel.degree))
        .to_array();
    let lambda = lyapunov(sum, terms).to_array();

    let mut traces = [Trace {
        smooth: 0.0,
        lyapunov: None,
    }; LANES];
    for (k, trace) in traces.iter_mut().enumerate() {
        trace.smooth = values[k];
        if kernel.stability {
            trace.lyapunov = Some(lambda[k]);
        }
    }
    traces
}

struct VectorVisit<'a> {
    kernel: &'a Kernel,
    points: &'a [Complex<f64>; LANES],
}

impl<'a> StepVisitor for VectorVisit<'a> {
    type Output = [Trace; LANES];

    fn visit<R: Recurrence>(self, rule: R) -> [Trace; LANES] {
        escape4_with(rule, self.kernel, self.points)
    }
}

/// Iterates four points, picking the vector instantiation from the
/// kernel's resolved step.
pub fn escape4(kernel: &Kernel, points: &[Complex<f64>; LANES]) -> [Trace; LANES] {
    kernel.step.dispatch(VectorVisit { kernel, points })
}

/// Whether `wide` was built to run an `f64x4` as one 256-bit register.
/// It picks its instructions from the compile-time target features, so
/// without `-C target-feature=+avx` (or a `target-cpu` that has it) the
/// vector kernels run each quad as two 128-bit halves.
pub const FULL_WIDTH: bool = cfg!(target_feature = "avx");

/// Whether the renderer should take the vector path on this machine.
///
/// On x86 this is a runtime AVX check.  It does not change the
/// instructions the vector kernels issue, which `FULL_WIDTH` fixes at
/// build time; it only keeps machines without 256-bit registers on the
/// scalar kernels.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn vector_support() -> bool {
    is_x86_feature_detected!("avx")
}

/// Whether the renderer should take the vector path on this machine.
/// NEON runs each quad as two 128-bit halves.
#[cfg(target_arch = "aarch64")]
pub fn vector_support() -> bool {
    true
}

/// Whether the renderer should take the vector path on this machine.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
pub fn vector_support() -> bool {
    false
}
