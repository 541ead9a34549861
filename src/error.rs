// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Every way a run can fail.  Configuration problems are detected
//! before any worker computes anything; allocation and I/O failures
//! are fatal and never retried.

use failure::Fail;
use std::io;

/// The single error type used throughout the crate.
#[derive(Debug, Fail)]
pub enum Error {
    /// Equal division was requested but the grid does not split evenly.
    #[fail(
        display = "{} units cannot be divided evenly among {} workers",
        total, workers
    )]
    Indivisible {
        /// Rows or columns along the partitioned axis.
        total: usize,
        /// Size of the worker fleet.
        workers: usize,
    },

    /// A fleet with no members cannot own any part of the grid.
    #[fail(display = "at least one worker is required")]
    NoWorkers,

    /// A worker id outside `0..workers`.
    #[fail(display = "worker {} does not exist in a fleet of {}", worker, workers)]
    UnknownWorker {
        /// The offending id.
        worker: usize,
        /// Size of the worker fleet.
        workers: usize,
    },

    /// The corners of the complex plane are not ordered.
    #[fail(display = "bad plane bounds: {}", _0)]
    BadBounds(String),

    /// A grid with no sample points.
    #[fail(display = "the grid has no sample points ({}x{})", width, height)]
    EmptyGrid {
        /// Samples per row.
        width: usize,
        /// Samples per column.
        height: usize,
    },

    /// The grid holds more samples than the address space can index.
    #[fail(display = "a {}x{} grid has too many sample points", width, height)]
    GridTooLarge {
        /// Samples per row.
        width: usize,
        /// Samples per column.
        height: usize,
    },

    /// The bitmap format cannot describe a raster this large.
    #[fail(display = "a {}x{} raster does not fit in a bitmap", width, height)]
    RasterTooLarge {
        /// Pixels per row.
        width: usize,
        /// Pixels per column.
        height: usize,
    },

    /// A result buffer could not be allocated.
    #[fail(display = "could not allocate a buffer of {} cells", cells)]
    Allocation {
        /// Number of iteration counts requested.
        cells: usize,
    },

    /// The gathered partitions leave a hole in, or overlap on, the grid.
    #[fail(display = "partition coverage error: {}", _0)]
    Coverage(String),

    /// A worker's buffer disagrees with the size of its partition.
    #[fail(
        display = "worker {} delivered {} cells for a partition of {}",
        worker, actual, expected
    )]
    BufferSize {
        /// The worker that produced the buffer.
        worker: usize,
        /// Cells the partition should contain.
        expected: usize,
        /// Cells actually delivered.
        actual: usize,
    },

    /// A peer hung up in the middle of a collective operation.
    #[fail(display = "worker {} disconnected during a collective", rank)]
    Disconnected {
        /// The rank that went away.
        rank: usize,
    },

    /// A worker thread panicked.
    #[fail(display = "worker {} panicked", _0)]
    WorkerPanic(usize),

    /// The run state machine was driven out of order.
    #[fail(display = "illegal run transition from {} to {}", from, to)]
    IllegalTransition {
        /// State the run was in.
        from: &'static str,
        /// State that was requested.
        to: &'static str,
    },

    /// The output raster could not be written.
    #[fail(display = "i/o failure: {}", _0)]
    Io(#[cause] io::Error),
}

impl Error {
    /// True for errors that stem from the startup configuration
    /// rather than from running the computation.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Indivisible { .. }
            | Error::NoWorkers
            | Error::UnknownWorker { .. }
            | Error::BadBounds(_)
            | Error::EmptyGrid { .. }
            | Error::GridTooLarge { .. }
            | Error::RasterTooLarge { .. } => true,
            _ => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
