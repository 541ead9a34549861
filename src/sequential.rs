//! The single-worker reference path: no partitioning and no
//! aggregation, just the kernel over the whole grid.  Distributed runs
//! are checked against this cell for cell.

use crate::aggregate::GlobalResult;
use crate::error::Error;
use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::worker::allocate;
use itertools::iproduct;
use log::info;
use std::time::{Duration, Instant};

/// Evaluates the kernel over the whole grid, row-major, and returns
/// the result with the time the loop took.
pub fn run_sequential(grid: &Grid, kernel: &Kernel) -> Result<(GlobalResult, Duration), Error> {
    let mut counts = allocate(grid.len())?;

    let start = Instant::now();
    for ((row, col), count) in iproduct!(0..grid.height(), 0..grid.width()).zip(counts.iter_mut()) {
        *count = kernel.iterate(grid.point(row, col));
    }
    let elapsed = start.elapsed();

    info!(
        "sequential {}x{} grid computed in {:.4}s",
        grid.width(),
        grid.height(),
        elapsed.as_secs_f64()
    );
    Ok((GlobalResult::from_rows(grid, counts)?, elapsed))
}
