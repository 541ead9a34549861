//! Splits one axis of the grid into contiguous, half-open slices, one
//! per worker.  Two strategies are supported:
//!
//! * **Equal division** hands every worker exactly `total / workers`
//!   units and refuses to plan at all when that leaves a remainder.
//! * **Remainder absorbing** hands every worker `total / workers`
//!   units and gives the leftover to the last worker, which never
//!   fails but leaves that worker with the heaviest load.
//!
//! Either way the slices are disjoint and cover `[0, total)`.

use crate::error::Error;
use std::fmt;
use std::ops::Range;

/// The grid axis being divided.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Each worker owns a band of whole rows.
    Rows,
    /// Each worker owns a band of whole columns.
    Columns,
}

/// How leftover units are dealt with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Leftovers are a configuration error.
    EqualDivision,
    /// The last worker takes the leftovers.
    RemainderAbsorbing,
}

/// A contiguous half-open range of rows or columns owned by a single worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    /// Which axis `start..end` indexes.
    pub axis: Axis,
    /// First global index owned.
    pub start: usize,
    /// One past the last global index owned.
    pub end: usize,
}

impl Partition {
    /// Number of rows or columns in the slice.  An inverted range
    /// counts as empty.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// An empty slice, possible when there are more workers than units.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the global index `index` is owned by this slice.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Maps a local index inside the slice to its global index.
    #[inline]
    pub fn to_global(&self, local: usize) -> usize {
        self.start + local
    }

    /// The owned range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let what = match self.axis {
            Axis::Rows => "rows",
            Axis::Columns => "columns",
        };
        write!(f, "{} [{}, {})", what, self.start, self.end)
    }
}

/// Plans slices along one axis with one strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Planner {
    /// How leftovers are handled.
    pub strategy: Strategy,
    /// Which axis is divided.
    pub axis: Axis,
}

impl Planner {
    /// Constructor.
    pub fn new(strategy: Strategy, axis: Axis) -> Self {
        Planner { strategy, axis }
    }

    /// Decides whether `total` units can be planned for `workers`.  The
    /// answer depends only on the arguments, so every worker reaches
    /// the same verdict without talking to the others.
    pub fn validate(&self, total: usize, workers: usize) -> Result<(), Error> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        if self.strategy == Strategy::EqualDivision && total % workers != 0 {
            return Err(Error::Indivisible { total, workers });
        }
        Ok(())
    }

    /// The slice owned by `worker`.
    pub fn plan(&self, total: usize, workers: usize, worker: usize) -> Result<Partition, Error> {
        self.validate(total, workers)?;
        if worker >= workers {
            return Err(Error::UnknownWorker { worker, workers });
        }

        let share = total / workers;
        let start = worker * share;
        let end = match self.strategy {
            Strategy::EqualDivision => start + share,
            Strategy::RemainderAbsorbing if worker == workers - 1 => total,
            Strategy::RemainderAbsorbing => start + share,
        };

        Ok(Partition {
            axis: self.axis,
            start,
            end,
        })
    }

    /// Every worker's slice, indexed by worker id.
    pub fn plan_all(&self, total: usize, workers: usize) -> Result<Vec<Partition>, Error> {
        (0..workers)
            .map(|worker| self.plan(total, workers, worker))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGIES: [Strategy; 2] = [Strategy::EqualDivision, Strategy::RemainderAbsorbing];

    // Counts how often each index in [0, total) is claimed.
    fn coverage(parts: &[Partition], total: usize) -> Vec<usize> {
        let mut seen = vec![0; total];
        for p in parts {
            for i in p.range() {
                seen[i] += 1;
            }
        }
        seen
    }

    #[test]
    fn partitions_are_disjoint_and_exhaustive() {
        for strategy in &STRATEGIES {
            let planner = Planner::new(*strategy, Axis::Rows);
            for total in 0..97 {
                for workers in 1..17 {
                    let parts = match planner.plan_all(total, workers) {
                        Ok(parts) => parts,
                        Err(_) => {
                            assert_eq!(*strategy, Strategy::EqualDivision);
                            assert_ne!(total % workers, 0);
                            continue;
                        }
                    };
                    assert_eq!(parts.len(), workers);
                    assert!(coverage(&parts, total).iter().all(|&n| n == 1));
                    assert_eq!(parts[0].start, 0);
                    assert_eq!(parts[workers - 1].end, total);
                    for pair in parts.windows(2) {
                        assert_eq!(pair[0].end, pair[1].start);
                    }
                }
            }
        }
    }

    #[test]
    fn equal_division_rejects_remainders() {
        let planner = Planner::new(Strategy::EqualDivision, Axis::Columns);
        match planner.plan(801, 4, 0) {
            Err(Error::Indivisible {
                total: 801,
                workers: 4,
            }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(planner.plan_all(801, 3).is_ok());
        assert!(planner.validate(800, 3).is_err());
    }

    #[test]
    fn equal_division_maps_local_to_global() {
        let planner = Planner::new(Strategy::EqualDivision, Axis::Columns);
        let share = 801 / 3;
        for worker in 0..3 {
            let p = planner.plan(801, 3, worker).unwrap();
            assert_eq!(p.len(), share);
            for local in &[0, 1, share - 1] {
                assert_eq!(p.to_global(*local), worker * share + local);
            }
        }
    }

    #[test]
    fn last_worker_absorbs_the_remainder() {
        let planner = Planner::new(Strategy::RemainderAbsorbing, Axis::Rows);
        let parts = planner.plan_all(800, 3).unwrap();
        let sizes: Vec<usize> = parts.iter().map(|p| p.len()).collect();
        assert_eq!(sizes, vec![266, 266, 268]);
        assert_eq!(sizes.iter().sum::<usize>(), 800);
        assert_eq!(parts[2].to_global(0), 532);
    }

    #[test]
    fn more_workers_than_units() {
        let planner = Planner::new(Strategy::RemainderAbsorbing, Axis::Rows);
        let parts = planner.plan_all(3, 5).unwrap();
        assert!(parts[..4].iter().all(|p| p.is_empty()));
        assert_eq!(parts[4].range(), 0..3);
    }

    #[test]
    fn bad_worker_counts_and_ids() {
        for strategy in &STRATEGIES {
            let planner = Planner::new(*strategy, Axis::Rows);
            match planner.plan(10, 0, 0) {
                Err(Error::NoWorkers) => {}
                other => panic!("unexpected {:?}", other),
            }
            match planner.plan(10, 2, 2) {
                Err(Error::UnknownWorker { worker: 2, workers: 2 }) => {}
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn inverted_range_is_empty() {
        let p = Partition {
            axis: Axis::Rows,
            start: 5,
            end: 2,
        };
        assert_eq!(p.len(), 0);
        assert!(p.is_empty());
        assert!(!p.contains(3));
    }

    #[test]
    fn displays_axis_and_range() {
        let p = Partition {
            axis: Axis::Columns,
            start: 4,
            end: 8,
        };
        assert_eq!(format!("{}", p), "columns [4, 8)");
        assert!(p.contains(4) && p.contains(7) && !p.contains(8));
    }
}
