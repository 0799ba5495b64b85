#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractile: a tile-parallel escape-time fractal renderer
//!
//! Escape-time fractals color each point of the complex plane by how
//! quickly it runs off to infinity when a formula is applied to it
//! over and over.  The Mandelbrot set iterates `z² + c` from zero with
//! `c` the point itself; Julia sets fix `c` and start from the point;
//! the Burning Ship, Celtic, Buffalo, Mandelbar and Multibrot families
//! change the formula.
//!
//! The interesting part is getting through millions of pixels
//! quickly.  The raster is cut into tiles, the tiles are spread over a
//! pool of worker threads, and within each tile four pixels at a time
//! are iterated together in vector registers.  Pixels in the same
//! vector escape at different times, so each lane carries its own
//! "still going" flag and freezes in place once it escapes while its
//! neighbours keep iterating.  The update rules are written once,
//! generically, and shared by the vector kernels, the scalar kernels
//! and the orbit tracer, so all three agree.
//!
//! Each pixel yields a smooth (fractional) escape count, and on request
//! a Lyapunov exponent, and those are looked up in a palette.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub mod config;
pub mod errors;
pub mod lanes;
pub mod measure;
pub mod orbit;
pub mod palette;
pub mod planes;
pub mod pool;
pub mod raster;
pub mod recurrence;
pub mod renderer;
pub mod scalar;
pub mod simd;
pub mod tiles;

pub use config::{parse_pair, ColorMode, Formula, Rectify, RectifyStage, Seeding, ViewportConfig};
pub use errors::FractalError;
pub use orbit::compute_orbit;
pub use palette::PaletteSet;
pub use planes::{Pixel, PlaneMapper};
pub use raster::Raster;
pub use recurrence::DEFAULT_PROMOTION_TOLERANCE;
pub use renderer::Renderer;
pub use scalar::Trace;
