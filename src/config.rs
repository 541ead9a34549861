//! Startup configuration.  A `Config` is built once, before any worker
//! starts, and is never changed afterwards.  The presets reproduce the
//! three classic setups this renderer grew out of.

use crate::error::Error;
use crate::grid::Grid;
use crate::kernel::{Kernel, Seed, MAX_ITER};
use crate::partition::{Axis, Planner, Strategy};
use crate::run::{Assignment, Job};
use num::Complex;
use std::path::PathBuf;

/// Default output file for the sequential path.
pub const DEFAULT_OUTPUT: &str = "mandelbrot_sequential.bmp";

/// Everything fixed at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The sample lattice.
    pub grid: Grid,
    /// Iteration bound.
    pub max_iter: u32,
    /// Where orbits start.
    pub seed: Seed,
    /// Size of the fleet.
    pub workers: usize,
    /// How leftovers are handled.
    pub strategy: Strategy,
    /// Which axis is divided.
    pub axis: Axis,
    /// How slices are handed out.
    pub assignment: Assignment,
    /// Where the sequential path writes its bitmap.
    pub output: PathBuf,
}

impl Config {
    /// Full-HD image of `[-2, 2] x [-2, 2]`, orbits from the origin.
    pub fn sequential() -> Result<Config, Error> {
        Ok(Config {
            grid: Grid::new(1920, 1080, Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0))?,
            max_iter: MAX_ITER,
            seed: Seed::Origin,
            workers: 1,
            strategy: Strategy::RemainderAbsorbing,
            axis: Axis::Rows,
            assignment: Assignment::Formula,
            output: PathBuf::from(DEFAULT_OUTPUT),
        })
    }

    /// 801x800 columns of `[-2, 1] x [-1.5, 1.5]`, divided equally.
    /// Only fleets whose size divides 801 can run it.
    pub fn columns() -> Result<Config, Error> {
        Ok(Config {
            grid: Grid::new(801, 800, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5))?,
            max_iter: MAX_ITER,
            seed: Seed::Point,
            workers: num_cpus::get(),
            strategy: Strategy::EqualDivision,
            axis: Axis::Columns,
            assignment: Assignment::Formula,
            output: PathBuf::from(DEFAULT_OUTPUT),
        })
    }

    /// 800x800 rows of `[-2, 2] x [-2, 2]`; the last worker absorbs the
    /// remainder.
    pub fn rows() -> Result<Config, Error> {
        Ok(Config {
            grid: Grid::new(800, 800, Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0))?,
            max_iter: MAX_ITER,
            seed: Seed::Origin,
            workers: num_cpus::get(),
            strategy: Strategy::RemainderAbsorbing,
            axis: Axis::Rows,
            assignment: Assignment::Formula,
            output: PathBuf::from(DEFAULT_OUTPUT),
        })
    }

    /// Looks a preset up by name.
    pub fn preset(name: &str) -> Option<Result<Config, Error>> {
        match name {
            "sequential" => Some(Config::sequential()),
            "columns" => Some(Config::columns()),
            "rows" => Some(Config::rows()),
            _ => None,
        }
    }

    /// The escape-time evaluator this configuration describes.
    pub fn kernel(&self) -> Kernel {
        Kernel::new(self.max_iter, self.seed)
    }

    /// The planner this configuration describes.
    pub fn planner(&self) -> Planner {
        Planner::new(self.strategy, self.axis)
    }

    /// The job every worker runs.
    pub fn job(&self) -> Job {
        Job {
            grid: self.grid,
            kernel: self.kernel(),
            planner: self.planner(),
            assignment: self.assignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_their_names() {
        let c = Config::columns().unwrap();
        assert_eq!((c.grid.width(), c.grid.height()), (801, 800));
        assert_eq!(c.axis, Axis::Columns);
        assert_eq!(c.strategy, Strategy::EqualDivision);
        assert!(c.workers >= 1);

        let r = Config::rows().unwrap();
        assert_eq!(r.planner(), Planner::new(Strategy::RemainderAbsorbing, Axis::Rows));

        let s = Config::sequential().unwrap();
        assert_eq!(s.kernel(), Kernel::new(MAX_ITER, Seed::Origin));
        assert_eq!(s.output, PathBuf::from("mandelbrot_sequential.bmp"));
    }

    #[test]
    fn preset_lookup() {
        assert!(Config::preset("rows").is_some());
        assert!(Config::preset("diagonal").is_none());
    }

    #[test]
    fn job_carries_the_configuration() {
        let c = Config::columns().unwrap();
        let job = c.job();
        assert_eq!(job.grid, c.grid);
        assert_eq!(job.planner.axis, Axis::Columns);
        assert_eq!(job.kernel.max_iter(), MAX_ITER);
        assert_eq!(job.assignment, Assignment::Formula);
    }
}
