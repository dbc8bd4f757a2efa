//! Multi-threaded back-end of the simulation

use crate::{
    resacc::RunAccumulator,
    scheduling::{batches, Batch},
    Result,
};

use std::sync::Mutex;

/// Simulate events in multi-threaded mode
///
/// Each batch of events is simulated by its own task, and results are merged
/// in batch order so that they do not depend on task scheduling.
///
pub fn run_simulation_impl(
    num_events: usize,
    simulate_events: impl Send + Sync + Fn(Batch) -> Result<RunAccumulator>,
) -> Result<RunAccumulator> {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must simulate at least one event");

    // The results of parallel tasks will be aggregated in a reproducible way
    let accumulator = ReproducibleAccumulator::new(batches(num_events).count());

    // This function is a synchronization scope: it will only return
    // once all inner tasks have been executed
    rayon::scope(|scope| {
        for batch in batches(num_events) {
            let accumulator_ref = &accumulator;
            let simulate_events_ref = &simulate_events;
            scope.spawn(move |_| {
                let result = simulate_events_ref(batch);
                accumulator_ref.set_task_result(batch.index, result);
            });
        }
    });

    // Extract the results from the accumulator
    accumulator.get_merged_result()
}

/// Reproducibility-optimized results accumulation mechanism
struct ReproducibleAccumulator {
    /// Storage for the intermediary simulation results of parallel tasks
    results: Box<[Mutex<Option<Result<RunAccumulator>>>]>,
}
//
impl ReproducibleAccumulator {
    /// Set up results storage for N parallel tasks
    fn new(num_tasks: usize) -> Self {
        assert!(num_tasks > 0, "There should be at least one task");
        Self {
            results: (0..num_tasks)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Integrate the results of the n-th simulation task
    fn set_task_result(&self, task_id: usize, result: Result<RunAccumulator>) {
        let mut lock = self.results[task_id]
            .lock()
            .expect("Mutex data should be valid");
        assert!(lock.is_none(), "Tasks should not report results twice");
        *lock = Some(result);
    }

    /// Aggregate the results in a reproducible fashion
    fn get_merged_result(self) -> Result<RunAccumulator> {
        // Start iterating over the task results
        let mut results_iter = self.results.into_vec().into_iter().map(|entry| {
            entry
                .into_inner()
                .expect("Mutex data should be valid")
                .expect("Result should be ready")
        });

        // Initialize results storage with the result of the first task
        let first_result = results_iter
            .next()
            .expect("There should be at least one task")?;

        // Merge the results of the other tasks, stopping at the first error
        results_iter.try_fold(first_result, |mut r1, r2| {
            r1.merge(&r2?);
            Ok(r1)
        })
    }
}
