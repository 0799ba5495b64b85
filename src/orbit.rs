// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Replays one point's iteration and keeps every value it visits.
//! Sequential and short, so it runs on the caller's thread.

use num::Complex;

use crate::config::ViewportConfig;
use crate::lanes::Pair;
use crate::measure::ESCAPE_RADIUS_SQ;
use crate::recurrence::{Kernel, Recurrence, StepVisitor};

struct Trail {
    kernel: Kernel,
    seed: Complex<f64>,
    max_steps: usize,
}

impl StepVisitor for Trail {
    type Output = Vec<Complex<f64>>;

    fn visit<R: Recurrence>(self, rule: R) -> Vec<Complex<f64>> {
        let (mut z, c) = self.kernel.seed(Pair::new(self.seed.re, self.seed.im));
        let mut orbit = Vec::with_capacity(self.max_steps.min(1024) + 1);
        orbit.push(Complex::new(z.re, z.im));
        for _ in 0..self.max_steps {
            let squares = z.squares();
            if squares.re + squares.im > ESCAPE_RADIUS_SQ {
                break;
            }
            z = rule.next(z, squares, c);
            orbit.push(Complex::new(z.re, z.im));
        }
        orbit
    }
}

/// The orbit of `seed` under `config`'s formula and seeding: the
/// starting value followed by up to `max_steps` iterates.  The trail
/// stops after the first value outside the escape radius.
pub fn compute_orbit(seed: Complex<f64>, config: &ViewportConfig, max_steps: usize) -> Vec<Complex<f64>> {
    let kernel = Kernel::from_config(config);
    kernel.step.dispatch(Trail {
        kernel,
        seed,
        max_steps,
    })
}
