// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tile scheduler.
//!
//! A render pass resolves the configuration into a `Kernel` once, cuts
//! the raster into tiles and hands each tile to the worker pool as an
//! independent task.  A task owns copies of everything it reads and
//! sends back its tile's colors; the raster is only written on the
//! calling thread once the pool's barrier releases, so tiles finishing
//! in any order on any worker produce the same image.

use crossbeam::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{ColorMode, ViewportConfig};
use crate::errors::FractalError;
use crate::palette::PaletteSet;
use crate::planes::{Pixel, PlaneMapper};
use crate::pool::WorkerPool;
use crate::raster::Raster;
use crate::recurrence::{Kernel, Recurrence, StepVisitor, DEFAULT_PROMOTION_TOLERANCE};
use crate::scalar::{escape_with, Trace};
use crate::simd::{escape4_with, vector_support, FULL_WIDTH, LANES};
use crate::tiles::{tiles, Tile, DEFAULT_TILE_SIZE};

/// Turns one pixel's trace into a color according to the color mode.
pub fn shade(trace: &Trace, config: &ViewportConfig, palettes: &PaletteSet) -> u32 {
    let smooth = || {
        palettes.color_for_smooth(
            trace.smooth,
            config.max_iter,
            config.palette,
            config.palette_offset,
        )
    };
    let stability = || {
        palettes.color_for_stability(
            trace.lyapunov.unwrap_or(0.0),
            config.palette,
            config.palette_offset,
        )
    };
    match config.color_mode {
        ColorMode::Escape => smooth(),
        ColorMode::Stability => stability(),
        ColorMode::Blended if trace.is_interior(config.max_iter) => stability(),
        ColorMode::Blended => smooth(),
    }
}

struct TileJob<'a> {
    tile: Tile,
    kernel: &'a Kernel,
    mapper: &'a PlaneMapper,
    config: &'a ViewportConfig,
    palettes: &'a PaletteSet,
    vector: bool,
}

impl<'a> StepVisitor for TileJob<'a> {
    type Output = Vec<u32>;

    fn visit<R: Recurrence>(self, rule: R) -> Vec<u32> {
        let tile = self.tile;
        let mut colors = Vec::with_capacity(tile.len());
        let mut row = Vec::with_capacity(tile.width);

        for y in tile.y..tile.y + tile.height {
            row.clear();
            row.extend((tile.x..tile.x + tile.width).map(|x| self.mapper.pixel_to_point(&Pixel(x, y))));

            let packed = if self.vector {
                row.len() - row.len() % LANES
            } else {
                0
            };
            for quad in row[..packed].chunks(LANES) {
                let points = [quad[0], quad[1], quad[2], quad[3]];
                for trace in escape4_with(rule, self.kernel, &points).iter() {
                    colors.push(shade(trace, self.config, self.palettes));
                }
            }
            for point in row[packed..].iter() {
                let trace = escape_with(rule, self.kernel, *point);
                colors.push(shade(&trace, self.config, self.palettes));
            }
        }
        colors
    }
}

/// Owns the worker pool and the palettes, and renders viewports into
/// caller-supplied rasters.
pub struct Renderer {
    pool: WorkerPool,
    palettes: Arc<PaletteSet>,
    vector_supported: bool,
    vector_enabled: bool,
    tile_size: usize,
    promotion_tolerance: f64,
    last_render: Duration,
}

fn resolve_threads(threads: usize) -> usize {
    if threads == 0 {
        num_cpus::get()
    } else {
        threads
    }
}

impl Renderer {
    /// A renderer with one worker per logical CPU.
    pub fn new(palettes: PaletteSet) -> Result<Renderer, FractalError> {
        Renderer::with_threads(palettes, 0)
    }

    /// A renderer with `threads` workers; zero picks one per logical
    /// CPU.
    pub fn with_threads(palettes: PaletteSet, threads: usize) -> Result<Renderer, FractalError> {
        let vector_supported = vector_support();
        if vector_supported {
            info!(
                "vector kernels available, {}-bit instructions",
                if FULL_WIDTH { 256 } else { 128 }
            );
        } else {
            info!("vector kernels unavailable, using scalar kernels");
        }
        Ok(Renderer {
            pool: WorkerPool::new(resolve_threads(threads))?,
            palettes: Arc::new(palettes),
            vector_supported,
            vector_enabled: true,
            tile_size: DEFAULT_TILE_SIZE,
            promotion_tolerance: DEFAULT_PROMOTION_TOLERANCE,
            last_render: Duration::from_secs(0),
        })
    }

    /// Replaces the worker pool with one of `threads` workers; zero
    /// picks one per logical CPU.  The old pool finishes its queue and
    /// is joined.  Only call this between renders.
    pub fn set_thread_count(&mut self, threads: usize) -> Result<(), FractalError> {
        let threads = resolve_threads(threads);
        if threads != self.pool.size() {
            self.pool = WorkerPool::new(threads)?;
        }
        Ok(())
    }

    /// Current number of workers.
    pub fn thread_count(&self) -> usize {
        self.pool.size()
    }

    /// Allows or forbids the vector kernels.  Forbidding them forces
    /// the scalar path even on hardware that could vectorize.
    pub fn set_vector_path_enabled(&mut self, enabled: bool) {
        self.vector_enabled = enabled;
    }

    /// True if the next render will use the vector kernels.
    pub fn vector_path_active(&self) -> bool {
        self.vector_enabled && self.vector_supported
    }

    /// Edge length of the scheduling tiles; zero is treated as one.
    pub fn set_tile_size(&mut self, size: usize) {
        self.tile_size = size.max(1);
    }

    /// How close a real exponent must be to an integer to run on the
    /// integer kernels.
    pub fn set_promotion_tolerance(&mut self, tolerance: f64) {
        self.promotion_tolerance = tolerance;
    }

    /// The palettes this renderer colors with.
    pub fn palettes(&self) -> &PaletteSet {
        &self.palettes
    }

    /// Wall-clock time of the most recent render.
    pub fn last_render(&self) -> Duration {
        self.last_render
    }

    /// Fills every pixel of `raster` from `config` and returns the time
    /// taken.  An empty raster is left alone.
    pub fn render(&mut self, config: &ViewportConfig, raster: &mut Raster) -> Duration {
        if raster.is_empty() {
            self.last_render = Duration::from_secs(0);
            return self.last_render;
        }

        let start = Instant::now();
        let kernel = Kernel::new(config, self.promotion_tolerance);
        let mapper = PlaneMapper::new(raster.width(), raster.height(), config.center, config.view_width);
        let vector = self.vector_path_active();
        let tiles = tiles(raster.width(), raster.height(), self.tile_size);
        let (sender, receiver) = channel::unbounded::<(Tile, Vec<u32>)>();

        for tile in tiles.iter().cloned() {
            let sender = sender.clone();
            let palettes = self.palettes.clone();
            let config = *config;
            self.pool.submit(move || {
                let colors = kernel.step.dispatch(TileJob {
                    tile,
                    kernel: &kernel,
                    mapper: &mapper,
                    config: &config,
                    palettes: &palettes,
                    vector,
                });
                if sender.send((tile, colors)).is_err() {
                    warn!("render finished before tile {:?} reported", tile);
                }
            });
        }
        drop(sender);
        self.pool.wait();

        for (tile, colors) in receiver.try_iter() {
            raster.blit(&tile, &colors);
        }

        self.last_render = start.elapsed();
        debug!(
            "rendered {} at {}x{}: {} tiles on {} threads, {} kernels, {:?}",
            config,
            raster.width(),
            raster.height(),
            tiles.len(),
            self.pool.size(),
            if vector { "vector" } else { "scalar" },
            self.last_render
        );
        self.last_render
    }
}
