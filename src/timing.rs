//! Per-worker timings and the summary the coordinator reports.
//!
//! The three reported lines all come from one worker, the coordinator:
//! its own compute loop and its own aggregation step.  The coordinator's
//! aggregation already waits out the slowest worker, so adding a
//! fleet-wide maximum on top would count that work twice.  Fleet-wide
//! figures are kept apart and labelled as such.

use std::fmt;
use std::time::Duration;

/// What one worker measured about itself.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Timing {
    /// The compute loop alone.
    pub compute: Duration,
    /// The aggregation step alone.
    pub communication: Duration,
}

impl Timing {
    /// Compute plus communication for this worker.
    pub fn elapsed(&self) -> Duration {
        self.compute + self.communication
    }
}

/// The combined figures held by the coordinator.  All values are seconds.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TimingSummary {
    /// The coordinator's compute loop.
    pub compute: f64,
    /// The coordinator's aggregation time.
    pub communication: f64,
    /// Longest compute loop of any worker.
    pub compute_max: f64,
    /// Sum over every worker of its aggregation time.
    pub communication_total: f64,
    /// Sum over every worker of its compute loop.
    pub compute_total: f64,
}

impl TimingSummary {
    /// The coordinator's compute plus its communication.
    pub fn elapsed(&self) -> f64 {
        self.compute + self.communication
    }

    /// A single-worker summary, as produced by the sequential path.
    pub fn single(timing: Timing) -> Self {
        let compute = timing.compute.as_secs_f64();
        let communication = timing.communication.as_secs_f64();
        TimingSummary {
            compute,
            communication,
            compute_max: compute,
            communication_total: communication,
            compute_total: compute,
        }
    }
}

/// The console report printed by the coordinator.
pub struct Report<'a> {
    summary: &'a TimingSummary,
    detailed: bool,
}

impl<'a> Report<'a> {
    /// The three-line report.
    pub fn new(summary: &'a TimingSummary) -> Self {
        Report {
            summary,
            detailed: false,
        }
    }

    /// Adds the fleet-wide figures after the three standard lines.
    pub fn detailed(summary: &'a TimingSummary) -> Self {
        Report {
            summary,
            detailed: true,
        }
    }
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Elapsed Time: {:.4} seconds", self.summary.elapsed())?;
        writeln!(f, "Computation Time: {:.4} seconds", self.summary.compute)?;
        write!(
            f,
            "Communication Time: {:.4} seconds",
            self.summary.communication
        )?;
        if self.detailed {
            write!(
                f,
                "\nSlowest Worker Computation Time: {:.4} seconds",
                self.summary.compute_max
            )?;
            write!(
                f,
                "\nTotal Communication Time (all workers): {:.4} seconds",
                self.summary.communication_total
            )?;
            write!(
                f,
                "\nTotal Computation Time (all workers): {:.4} seconds",
                self.summary.compute_total
            )?;
        }
        Ok(())
    }
}
