//! The per-worker compute loop.  A worker walks every sample in its
//! slice, evaluates the kernel, and keeps the counts in a buffer it
//! owns outright until that buffer is handed to the coordinator.

use crate::error::Error;
use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::partition::{Axis, Partition};
use itertools::iproduct;
use log::debug;
use std::time::{Duration, Instant};

/// The counts one worker computed for its slice.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalResult {
    /// The worker that produced the buffer.
    pub worker: usize,
    /// The slice the buffer covers.
    pub partition: Partition,
    /// Iteration counts.  Row slices are stored row-major, column
    /// slices column-major, so each unit of the slice is contiguous.
    pub counts: Vec<u32>,
    /// Wall-clock time spent in the loop.
    pub compute: Duration,
}

impl LocalResult {
    /// Reads a count by global coordinates, if this slice owns them.
    pub fn get(&self, grid: &Grid, row: usize, col: usize) -> Option<u32> {
        let offset = match self.partition.axis {
            Axis::Rows if self.partition.contains(row) && col < grid.width() => {
                (row - self.partition.start) * grid.width() + col
            }
            Axis::Columns if self.partition.contains(col) && row < grid.height() => {
                (col - self.partition.start) * grid.height() + row
            }
            _ => return None,
        };
        self.counts.get(offset).cloned()
    }
}

/// Allocates a zeroed count buffer, reporting failure instead of aborting.
pub fn allocate(cells: usize) -> Result<Vec<u32>, Error> {
    let mut buffer: Vec<u32> = Vec::new();
    buffer
        .try_reserve_exact(cells)
        .map_err(|_| Error::Allocation { cells })?;
    buffer.resize(cells, 0);
    Ok(buffer)
}

/// Evaluates the kernel over every sample in `partition`.
pub fn compute(
    grid: &Grid,
    kernel: &Kernel,
    partition: Partition,
    worker: usize,
) -> Result<LocalResult, Error> {
    let span = grid.span(partition.axis);
    let mut counts = allocate(partition.len() * span)?;

    let start = Instant::now();
    for ((local, across), count) in
        iproduct!(0..partition.len(), 0..span).zip(counts.iter_mut())
    {
        let unit = partition.to_global(local);
        let c = match partition.axis {
            Axis::Rows => grid.point(unit, across),
            Axis::Columns => grid.point(across, unit),
        };
        *count = kernel.iterate(c);
    }
    let elapsed = start.elapsed();

    debug!(
        "worker {} computed {} in {:.4}s",
        worker,
        partition,
        elapsed.as_secs_f64()
    );

    Ok(LocalResult {
        worker,
        partition,
        counts,
        compute: elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Seed, MAX_ITER};
    use num::Complex;

    fn grid() -> Grid {
        Grid::new(6, 4, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap()
    }

    #[test]
    fn row_slices_are_row_major() {
        let g = grid();
        let k = Kernel::new(MAX_ITER, Seed::Point);
        let p = Partition {
            axis: Axis::Rows,
            start: 1,
            end: 3,
        };
        let local = compute(&g, &k, p, 1).unwrap();
        assert_eq!(local.counts.len(), 2 * 6);
        assert_eq!(local.counts[7], k.iterate(g.point(2, 1)));
        for row in 1..3 {
            for col in 0..6 {
                assert_eq!(local.get(&g, row, col), Some(k.iterate(g.point(row, col))));
            }
        }
        assert_eq!(local.get(&g, 0, 0), None);
    }

    #[test]
    fn column_slices_are_column_major() {
        let g = grid();
        let k = Kernel::new(MAX_ITER, Seed::Origin);
        let p = Partition {
            axis: Axis::Columns,
            start: 3,
            end: 6,
        };
        let local = compute(&g, &k, p, 2).unwrap();
        assert_eq!(local.counts.len(), 3 * 4);
        assert_eq!(local.counts[4 + 2], k.iterate(g.point(2, 4)));
        assert_eq!(local.get(&g, 3, 5), Some(k.iterate(g.point(3, 5))));
        assert_eq!(local.get(&g, 3, 2), None);
    }

    #[test]
    fn empty_slices_compute_nothing() {
        let g = grid();
        let p = Partition {
            axis: Axis::Rows,
            start: 2,
            end: 2,
        };
        let local = compute(&g, &Kernel::default(), p, 0).unwrap();
        assert!(local.counts.is_empty());
    }

    #[test]
    fn impossible_allocations_are_reported() {
        match allocate(usize::max_value()) {
            Err(Error::Allocation { cells }) => assert_eq!(cells, usize::max_value()),
            other => panic!("unexpected {:?}", other.map(|b| b.len())),
        }
    }
}
