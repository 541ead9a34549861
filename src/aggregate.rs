//! Assembly of gathered slices into the single global result held by
//! the coordinator.  Buffers may arrive in any order; each one is
//! placed by the partition it carries, never by its arrival position.

use crate::error::Error;
use crate::grid::Grid;
use crate::partition::Axis;
use crate::worker::{allocate, LocalResult};

/// Iteration counts for the whole grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalResult {
    width: usize,
    height: usize,
    counts: Vec<u32>,
}

impl GlobalResult {
    /// Wraps an already row-major buffer covering the whole grid.
    pub fn from_rows(grid: &Grid, counts: Vec<u32>) -> Result<Self, Error> {
        if counts.len() != grid.len() {
            return Err(Error::BufferSize {
                worker: 0,
                expected: grid.len(),
                actual: counts.len(),
            });
        }
        Ok(GlobalResult {
            width: grid.width(),
            height: grid.height(),
            counts,
        })
    }

    /// Samples per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Samples per column.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The count at a global row and column.
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.counts.get(row * self.width + col).cloned()
    }

    /// All counts, row-major.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }
}

// Checks that the slices, taken together, claim every unit of the axis
// exactly once.
fn check_coverage(grid: &Grid, locals: &[LocalResult]) -> Result<Axis, Error> {
    let axis = match locals.first() {
        Some(first) => first.partition.axis,
        None => return Err(Error::Coverage("no buffers were gathered".to_string())),
    };

    let mut parts: Vec<_> = locals.iter().map(|l| (l.worker, l.partition)).collect();
    parts.sort_by_key(|&(_, p)| (p.start, p.end));

    let mut next = 0;
    for (worker, p) in parts {
        if p.axis != axis {
            return Err(Error::Coverage(format!(
                "worker {} partitioned {:?} while others partitioned {:?}",
                worker, p.axis, axis
            )));
        }
        if p.end < p.start {
            return Err(Error::Coverage(format!(
                "worker {}'s partition ends at {} before it starts at {}",
                worker, p.end, p.start
            )));
        }
        if p.start != next {
            let what = if p.start < next { "overlaps" } else { "leaves a gap before" };
            return Err(Error::Coverage(format!(
                "worker {}'s {} {} index {}",
                worker, p, what, next
            )));
        }
        next = p.end;
    }

    if next != grid.units(axis) {
        return Err(Error::Coverage(format!(
            "partitions end at {} but the grid has {}",
            next,
            grid.units(axis)
        )));
    }
    Ok(axis)
}

/// Places every gathered buffer at its partition's global offset.
/// Either every cell is written exactly once or nothing is returned.
pub fn assemble(grid: &Grid, locals: Vec<LocalResult>) -> Result<GlobalResult, Error> {
    let axis = check_coverage(grid, &locals)?;
    let span = grid.span(axis);

    for local in &locals {
        let expected = local.partition.len() * span;
        if local.counts.len() != expected {
            return Err(Error::BufferSize {
                worker: local.worker,
                expected,
                actual: local.counts.len(),
            });
        }
    }

    let width = grid.width();
    let mut counts = allocate(grid.len())?;
    for local in locals {
        let start = local.partition.start;
        match axis {
            // Whole rows are contiguous in both buffers.
            Axis::Rows => {
                let offset = start * width;
                counts[offset..offset + local.counts.len()].copy_from_slice(&local.counts);
            }
            Axis::Columns => {
                for (i, column) in local.counts.chunks(span).enumerate() {
                    let col = start + i;
                    for (row, count) in column.iter().enumerate() {
                        counts[row * width + col] = *count;
                    }
                }
            }
        }
    }

    GlobalResult::from_rows(grid, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Kernel;
    use crate::partition::{Planner, Strategy};
    use crate::worker::compute;
    use num::Complex;

    fn grid() -> Grid {
        Grid::new(9, 7, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap()
    }

    fn locals(grid: &Grid, planner: Planner, workers: usize) -> Vec<LocalResult> {
        let kernel = Kernel::default();
        planner
            .plan_all(grid.units(planner.axis), workers)
            .unwrap()
            .into_iter()
            .enumerate()
            .map(|(w, p)| compute(grid, &kernel, p, w).unwrap())
            .collect()
    }

    fn expected(grid: &Grid) -> Vec<u32> {
        let kernel = Kernel::default();
        let mut all = vec![];
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                all.push(kernel.iterate(grid.point(row, col)));
            }
        }
        all
    }

    #[test]
    fn assembles_rows_and_columns() {
        let g = grid();
        for axis in &[Axis::Rows, Axis::Columns] {
            let planner = Planner::new(Strategy::RemainderAbsorbing, *axis);
            let result = assemble(&g, locals(&g, planner, 4)).unwrap();
            assert_eq!(result.counts(), &expected(&g)[..]);
        }
    }

    #[test]
    fn delivery_order_does_not_matter() {
        let g = grid();
        let planner = Planner::new(Strategy::EqualDivision, Axis::Columns);
        let mut parts = locals(&g, planner, 3);
        parts.reverse();
        parts.swap(0, 1);
        let result = assemble(&g, parts).unwrap();
        assert_eq!(result.counts(), &expected(&g)[..]);
        assert_eq!(result.get(6, 8), expected(&g).last().cloned());
        assert_eq!(result.get(7, 0), None);
    }

    #[test]
    fn gaps_and_overlaps_are_rejected() {
        let g = grid();
        let planner = Planner::new(Strategy::RemainderAbsorbing, Axis::Rows);

        let mut parts = locals(&g, planner, 3);
        parts.remove(1);
        match assemble(&g, parts) {
            Err(Error::Coverage(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        let mut parts = locals(&g, planner, 3);
        let copy = parts[0].clone();
        parts.push(copy);
        assert!(assemble(&g, parts).is_err());

        let mut parts = locals(&g, planner, 3);
        parts.pop();
        assert!(assemble(&g, parts).is_err());

        assert!(assemble(&g, vec![]).is_err());
    }

    #[test]
    fn inverted_partitions_are_rejected() {
        let g = grid();
        let planner = Planner::new(Strategy::RemainderAbsorbing, Axis::Rows);
        let mut parts = locals(&g, planner, 2);
        let (start, end) = (parts[1].partition.start, parts[1].partition.end);
        parts[1].partition.start = end;
        parts[1].partition.end = start;
        match assemble(&g, parts) {
            Err(Error::Coverage(msg)) => assert!(msg.contains("before it starts"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn short_buffers_are_rejected() {
        let g = grid();
        let planner = Planner::new(Strategy::RemainderAbsorbing, Axis::Rows);
        let mut parts = locals(&g, planner, 2);
        parts[1].counts.pop();
        match assemble(&g, parts) {
            Err(Error::BufferSize { worker: 1, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn mixed_axes_are_rejected() {
        let g = grid();
        let mut parts = locals(&g, Planner::new(Strategy::RemainderAbsorbing, Axis::Rows), 2);
        let cols = locals(&g, Planner::new(Strategy::RemainderAbsorbing, Axis::Columns), 2);
        parts[1] = cols[1].clone();
        assert!(assemble(&g, parts).is_err());
    }
}
