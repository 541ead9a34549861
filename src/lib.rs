#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Distributed Mandelbrot renderer
//!
//! The Mandelbrot set takes a point on the complex plane and
//! repeatedly squares it and adds the original point back, counting
//! how many steps it takes for the result to run off towards
//! infinity.  That count, taken over a rectangular lattice of points,
//! is the image.
//!
//! Every point is independent of every other, so the lattice can be
//! cut into slices (bands of rows or bands of columns) and each slice
//! handed to a different worker.  The interesting part is putting the
//! slices back together: a single coordinator gathers every worker's
//! buffer, places each one by the slice it describes, and reports how
//! long the computation and the gathering took.
//!
//! A single-worker sequential path computes the same lattice with no
//! slicing at all.  It is the oracle the distributed path is checked
//! against, and it is the path that writes the bitmap.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod aggregate;
pub mod comm;
pub mod config;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod partition;
pub mod raster;
pub mod run;
pub mod sequential;
pub mod timing;
pub mod worker;

pub use aggregate::{assemble, GlobalResult};
pub use comm::{Communicator, ReduceOp, ThreadComm, ThreadWorld};
pub use config::Config;
pub use error::Error;
pub use grid::Grid;
pub use kernel::{Kernel, Seed, MAX_ITER};
pub use partition::{Axis, Partition, Planner, Strategy};
pub use run::{run_distributed, run_worker, Assignment, Job, Outcome, RunState};
pub use sequential::run_sequential;
pub use timing::{Report, Timing, TimingSummary};
pub use worker::{compute, LocalResult};
