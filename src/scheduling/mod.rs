//! This module takes care of scheduling the simulation work, encapsulating use
//! of multiple threads and anything else that will come in the future

#[cfg(not(feature = "multi-threading"))]
mod sequential;
#[cfg(feature = "multi-threading")]
mod multi_threading;

use crate::{resacc::RunAccumulator, Result};

/// Size of the simulated event batches
///
/// Each batch of events is simulated by its own event generator, seeded from
/// the batch index, so that sequential and parallel runs of the simulation
/// produce exactly the same results.
///
pub const EVENT_BATCH_SIZE: usize = 10_000;

/// A contiguous range of events which is simulated by one generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Position of the batch in the run
    pub index: usize,

    /// Index of the first event of the batch in the run
    pub first_event: usize,

    /// Number of events in the batch
    pub num_events: usize,
}
//
impl Batch {
    /// Seed of the generator which simulates this batch
    pub fn seed(&self, run_seed: u64) -> u64 {
        run_seed.wrapping_add(self.index as u64)
    }
}

/// Split a run into batches of at most EVENT_BATCH_SIZE events
pub fn batches(num_events: usize) -> impl Iterator<Item = Batch> {
    (0..num_events)
        .step_by(EVENT_BATCH_SIZE)
        .enumerate()
        .map(move |(index, first_event)| Batch {
            index,
            first_event,
            num_events: EVENT_BATCH_SIZE.min(num_events - first_event),
        })
}

/// Run the simulation in the manner that was configured at build time.
///
/// Takes as parameters the total number of events to be simulated, and a
/// simulation kernel that simulates a batch of events.
///
/// Returns the merged results of all batches, or the error of the first batch
/// which failed.
///
pub fn run_simulation(
    num_events: usize,
    simulate_events: impl Send + Sync + Fn(Batch) -> Result<RunAccumulator>,
) -> Result<RunAccumulator> {
    // Check that the user is being reasonable (should have already been checked
    // at configuration time, but bugs can happen...)
    assert!(num_events > 0, "Must simulate at least one event");

    // ...in sequential mode
    #[cfg(not(feature = "multi-threading"))]
    {
        sequential::run_simulation_impl(num_events, simulate_events)
    }

    // ...in multi-threaded mode
    #[cfg(feature = "multi-threading")]
    {
        multi_threading::run_simulation_impl(num_events, simulate_events)
    }
}
