//! A distributed run, written once and executed by every worker.
//!
//! Each run moves through `Init -> Partitioned -> Computing ->
//! Aggregating -> Done`.  `Init` is decided from shared configuration
//! alone, so either every worker advances or every worker fails before
//! computing anything.  `Aggregating` is the only point where workers
//! wait on each other.

use crate::aggregate::{assemble, GlobalResult};
use crate::comm::{Communicator, ReduceOp, ThreadWorld};
use crate::error::Error;
use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::partition::{Partition, Planner};
use crate::timing::TimingSummary;
use crate::worker::compute;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Where a run is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Configuration not yet checked.
    Init,
    /// Every worker knows its slice.
    Partitioned,
    /// Workers are evaluating the kernel.
    Computing,
    /// Buffers and timings are moving to the coordinator.
    Aggregating,
    /// The coordinator holds the global result.
    Done,
    /// Terminal, with no output.
    Failed,
}

impl RunState {
    fn name(self) -> &'static str {
        match self {
            RunState::Init => "INIT",
            RunState::Partitioned => "PARTITIONED",
            RunState::Computing => "COMPUTING",
            RunState::Aggregating => "AGGREGATING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        }
    }

    /// True for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        self == RunState::Done || self == RunState::Failed
    }

    /// Moves to `next` if the lifecycle allows it.
    pub fn advance(self, next: RunState) -> Result<RunState, Error> {
        let legal = match (self, next) {
            (RunState::Init, RunState::Partitioned)
            | (RunState::Partitioned, RunState::Computing)
            | (RunState::Computing, RunState::Aggregating)
            | (RunState::Aggregating, RunState::Done) => true,
            (from, RunState::Failed) => !from.is_terminal(),
            _ => false,
        };
        if legal {
            Ok(next)
        } else {
            Err(Error::IllegalTransition {
                from: self.name(),
                to: next.name(),
            })
        }
    }
}

/// How workers learn their slice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Assignment {
    /// Each worker plans its own slice from its rank.
    Formula,
    /// The coordinator plans every slice and scatters them.
    Scatter,
}

/// Everything a worker needs to take part in a run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Job {
    /// The sample lattice.
    pub grid: Grid,
    /// The escape-time evaluator.
    pub kernel: Kernel,
    /// How the grid is split.
    pub planner: Planner,
    /// How slices are handed out.
    pub assignment: Assignment,
}

/// What the coordinator holds once a run is done.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// The assembled grid.
    pub result: GlobalResult,
    /// The combined timings.
    pub timing: TimingSummary,
    /// Each worker's compute loop, by rank.
    pub worker_compute: Vec<Duration>,
}

fn partition_for<C: Communicator>(comm: &C, job: &Job) -> Result<Partition, Error> {
    let total = job.grid.units(job.planner.axis);
    match job.assignment {
        Assignment::Formula => job.planner.plan(total, comm.size(), comm.rank()),
        Assignment::Scatter => {
            let assignments = if comm.is_coordinator() {
                Some(job.planner.plan_all(total, comm.size())?)
            } else {
                None
            };
            comm.scatter(assignments)
        }
    }
}

/// The body every worker runs.  Only the coordinator returns an
/// outcome; everyone else returns `Ok(None)` once its part is sent.
pub fn run_worker<C: Communicator>(comm: &C, job: &Job) -> Result<Option<Outcome>, Error> {
    let rank = comm.rank();
    let state = RunState::Init;

    let total = job.grid.units(job.planner.axis);
    if let Err(e) = job.planner.validate(total, comm.size()) {
        // The caller reports `e`; only the state change is logged here.
        let state = state.advance(RunState::Failed)?;
        debug!("worker {} {:?}", rank, state);
        return Err(e);
    }

    let partition = partition_for(comm, job)?;
    let state = state.advance(RunState::Partitioned)?;
    debug!("worker {} {:?}: {}", rank, state, partition);

    let state = state.advance(RunState::Computing)?;
    debug!("worker {} {:?}", rank, state);
    let local = compute(&job.grid, &job.kernel, partition, rank)?;
    let compute_time = local.compute;

    let state = state.advance(RunState::Aggregating)?;
    debug!("worker {} {:?}", rank, state);
    let comm_started = Instant::now();
    let gathered = comm.gather(local)?;
    let communication = comm_started.elapsed();

    let compute_max = comm.reduce(compute_time.as_secs_f64(), ReduceOp::Max)?;
    let communication_total = comm.reduce(communication.as_secs_f64(), ReduceOp::Sum)?;
    let compute_total = comm.reduce(compute_time.as_secs_f64(), ReduceOp::Sum)?;

    let outcome = match (gathered, compute_max, communication_total, compute_total) {
        (Some(locals), Some(compute_max), Some(communication_total), Some(compute_total)) => {
            let mut worker_compute = vec![Duration::default(); locals.len()];
            for local in &locals {
                if let Some(slot) = worker_compute.get_mut(local.worker) {
                    *slot = local.compute;
                }
            }
            let result = assemble(&job.grid, locals)?;
            // The coordinator's gather only returns once the slowest
            // worker has sent, so its own two figures cover the run.
            let timing = TimingSummary {
                compute: compute_time.as_secs_f64(),
                communication: communication.as_secs_f64(),
                compute_max,
                communication_total,
                compute_total,
            };
            info!(
                "assembled {}x{} grid from {} workers",
                result.width(),
                result.height(),
                comm.size()
            );
            Some(Outcome {
                result,
                timing,
                worker_compute,
            })
        }
        _ => None,
    };

    let state = state.advance(RunState::Done)?;
    debug!("worker {} {:?}", rank, state);
    Ok(outcome)
}

/// Runs `job` on `workers` threads and returns the coordinator's outcome.
pub fn run_distributed(job: &Job, workers: usize) -> Result<Outcome, Error> {
    let world = ThreadWorld::new(workers)?;
    info!(
        "running {}x{} grid on {} workers ({:?} by {:?})",
        job.grid.width(),
        job.grid.height(),
        workers,
        job.planner.strategy,
        job.planner.axis
    );

    let results = crossbeam::scope(|spawner| {
        let handles: Vec<_> = world
            .into_iter()
            .map(|comm| spawner.spawn(move |_| run_worker(&comm, job)))
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| match handle.join() {
                Ok(result) => result,
                Err(_) => Err(Error::WorkerPanic(rank)),
            })
            .collect::<Vec<_>>()
    })
    .map_err(|_| Error::WorkerPanic(0))?;

    // The coordinator's own error is the one worth reporting; peers
    // usually fail only because the coordinator went away.
    let mut results = results.into_iter();
    let coordinator = match results.next() {
        Some(result) => result?,
        None => return Err(Error::NoWorkers),
    };
    for result in results {
        result?;
    }

    coordinator.ok_or_else(|| {
        Error::Coverage("the coordinator finished without a result".to_string())
    })
}
