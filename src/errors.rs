// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type the crate hands back to its callers.  Nothing
//! in the per-pixel path can fail; these are all about setting up a
//! render or getting the result onto disk.

use std::io;

/// Everything that can go wrong outside the numeric kernels.
#[derive(Debug, Fail)]
pub enum FractalError {
    /// A viewport configuration that cannot describe a render.
    #[fail(display = "invalid viewport configuration: {}", reason)]
    InvalidConfig {
        /// What was wrong with it.
        reason: String,
    },

    /// The operating system refused to give us a worker thread.
    #[fail(display = "could not start worker thread: {}", _0)]
    WorkerSpawn(#[cause] io::Error),

    /// The encoder or the filesystem rejected the image.
    #[fail(display = "could not write image {}: {}", path, reason)]
    Export {
        /// Destination we were writing to.
        path: String,
        /// The encoder's complaint.
        reason: String,
    },

    /// A command-line value that does not parse.
    #[fail(display = "could not parse {} from '{}'", what, input)]
    Parse {
        /// The kind of value expected.
        what: &'static str,
        /// The text we were given.
        input: String,
    },
}

impl FractalError {
    /// Shorthand for configuration failures.
    pub fn invalid<S: Into<String>>(reason: S) -> Self {
        FractalError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
