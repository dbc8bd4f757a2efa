//! Sequential back-end of the simulation

use crate::{
    resacc::RunAccumulator,
    scheduling::{batches, Batch},
    Result,
};

/// Simulate events in sequential mode
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs.
///
pub fn run_simulation_impl(
    num_events: usize,
    simulate_events: impl Fn(Batch) -> Result<RunAccumulator>,
) -> Result<RunAccumulator> {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must simulate at least one event");

    // Initialize the accumulator with the first batch of events
    let mut batches = batches(num_events);
    let first_batch = batches.next().expect("There should be at least one batch");
    let mut accumulator = simulate_events(first_batch)?;

    // Simulate and integrate the other batches (if any)
    for batch in batches {
        accumulator.merge(&simulate_events(batch)?);
    }

    // Return the final accumulated results
    Ok(accumulator)
}
