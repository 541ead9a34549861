//! The collective substrate the distributed run is written against.
//! Workers only ever need four things from it: who they are and how
//! many of them there are, a way for the coordinator to hand out work,
//! a blocking gather of result buffers at the coordinator, and a
//! blocking reduction of scalar timings.
//!
//! `ThreadWorld` provides those over crossbeam channels between
//! threads in a single process.

use crate::error::Error;
use crate::partition::Partition;
use crate::worker::LocalResult;
use crossbeam::channel::{bounded, Receiver, Sender};

/// The rank that gathers results and reports.
pub const COORDINATOR: usize = 0;

/// How scalars are combined by `reduce`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReduceOp {
    /// Sum over every worker.
    Sum,
    /// Maximum over every worker.
    Max,
}

impl ReduceOp {
    fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            ReduceOp::Sum => a + b,
            ReduceOp::Max => a.max(b),
        }
    }
}

/// A worker's view of the fleet.
pub trait Communicator: Send {
    /// This worker's identity, `0..size()`.
    fn rank(&self) -> usize;

    /// Size of the fleet.
    fn size(&self) -> usize;

    /// True for the rank that owns the global result.
    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }

    /// The coordinator passes one partition per rank, indexed by rank,
    /// and every rank (the coordinator included) gets back its own.
    /// Non-coordinators pass `None`.
    fn scatter(&self, assignments: Option<Vec<Partition>>) -> Result<Partition, Error>;

    /// Blocks until every rank has contributed.  The coordinator gets
    /// all buffers back ordered by rank; everyone else gets `None`.
    fn gather(&self, local: LocalResult) -> Result<Option<Vec<LocalResult>>, Error>;

    /// Combines one scalar from every rank; only the coordinator sees
    /// the result.
    fn reduce(&self, value: f64, op: ReduceOp) -> Result<Option<f64>, Error>;
}

enum Message {
    Assignment(Partition),
    Buffer(LocalResult),
    Scalar(f64),
}

// The coordinator keeps one link per peer so that each peer's messages
// arrive in order and are implicitly tagged with the sender's rank.
// Slot 0 (the coordinator itself) is unused.
struct Link {
    to_peer: Sender<Message>,
    from_peer: Receiver<Message>,
}

/// One endpoint of an in-process fleet.
pub struct ThreadComm {
    rank: usize,
    size: usize,
    peers: Vec<Option<Link>>,
    to_coordinator: Option<Sender<Message>>,
    from_coordinator: Option<Receiver<Message>>,
}

/// Builds the endpoints of an in-process fleet.
pub struct ThreadWorld;

impl ThreadWorld {
    /// Returns `size` connected endpoints, indexed by rank.  Channels are
    /// rendezvous channels, so a send blocks until the coordinator takes
    /// it, the way a collective call would.
    pub fn new(size: usize) -> Result<Vec<ThreadComm>, Error> {
        if size == 0 {
            return Err(Error::NoWorkers);
        }

        let mut peers: Vec<Option<Link>> = vec![None];
        let mut endpoints = vec![];
        for rank in 1..size {
            let (up_tx, up_rx) = bounded(0);
            let (down_tx, down_rx) = bounded(0);
            peers.push(Some(Link {
                to_peer: down_tx,
                from_peer: up_rx,
            }));
            endpoints.push(ThreadComm {
                rank,
                size,
                peers: vec![],
                to_coordinator: Some(up_tx),
                from_coordinator: Some(down_rx),
            });
        }

        let mut world = vec![ThreadComm {
            rank: COORDINATOR,
            size,
            peers,
            to_coordinator: None,
            from_coordinator: None,
        }];
        world.extend(endpoints);
        Ok(world)
    }
}

impl ThreadComm {
    fn send_up(&self, message: Message) -> Result<(), Error> {
        match self.to_coordinator {
            Some(ref tx) => tx.send(message).map_err(|_| Error::Disconnected {
                rank: COORDINATOR,
            }),
            None => Err(Error::Disconnected { rank: COORDINATOR }),
        }
    }

    fn receive_down(&self) -> Result<Message, Error> {
        match self.from_coordinator {
            Some(ref rx) => rx.recv().map_err(|_| Error::Disconnected {
                rank: COORDINATOR,
            }),
            None => Err(Error::Disconnected { rank: COORDINATOR }),
        }
    }

    fn link(&self, rank: usize) -> Result<&Link, Error> {
        match self.peers.get(rank) {
            Some(Some(link)) => Ok(link),
            _ => Err(Error::Disconnected { rank }),
        }
    }

    fn receive_from(&self, rank: usize) -> Result<Message, Error> {
        self.link(rank)?
            .from_peer
            .recv()
            .map_err(|_| Error::Disconnected { rank })
    }
}

// A message that arrives out of protocol order means the peer is not
// running the same program; treat it like a hang-up.
fn unexpected(rank: usize) -> Error {
    Error::Disconnected { rank }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn scatter(&self, assignments: Option<Vec<Partition>>) -> Result<Partition, Error> {
        if !self.is_coordinator() {
            return match self.receive_down()? {
                Message::Assignment(partition) => Ok(partition),
                _ => Err(unexpected(COORDINATOR)),
            };
        }

        let assignments = match assignments {
            Some(ref a) if a.len() == self.size => a,
            _ => {
                return Err(Error::Coverage(format!(
                    "scatter needs exactly {} assignments",
                    self.size
                )))
            }
        };
        for (rank, partition) in assignments.iter().enumerate().skip(1) {
            self.link(rank)?
                .to_peer
                .send(Message::Assignment(*partition))
                .map_err(|_| Error::Disconnected { rank })?;
        }
        Ok(assignments[COORDINATOR])
    }

    fn gather(&self, local: LocalResult) -> Result<Option<Vec<LocalResult>>, Error> {
        if !self.is_coordinator() {
            self.send_up(Message::Buffer(local))?;
            return Ok(None);
        }

        let mut all = Vec::with_capacity(self.size);
        all.push(local);
        for rank in 1..self.size {
            match self.receive_from(rank)? {
                Message::Buffer(mut buffer) => {
                    buffer.worker = rank;
                    all.push(buffer);
                }
                _ => return Err(unexpected(rank)),
            }
        }
        Ok(Some(all))
    }

    fn reduce(&self, value: f64, op: ReduceOp) -> Result<Option<f64>, Error> {
        if !self.is_coordinator() {
            self.send_up(Message::Scalar(value))?;
            return Ok(None);
        }

        let mut acc = value;
        for rank in 1..self.size {
            match self.receive_from(rank)? {
                Message::Scalar(v) => acc = op.combine(acc, v),
                _ => return Err(unexpected(rank)),
            }
        }
        Ok(Some(acc))
    }
}
