//! resoreco: resonance reconstruction from generated collision events
//!
//!
//! # Introduction (for the physicist)
//!
//! This small program generates proton-proton collisions at 13 TeV which
//! produce a single resonance, and reconstructs that resonance from its decay
//! products.
//!
//! Two channels are available. In the first one, a Standard Model Higgs boson
//! is produced by gluon fusion and forced to decay into a bottom quark pair
//! (H → bb̄). In the second one, a Z⁰ boson is produced by quark-antiquark
//! annihilation and left free to decay as it likes, keeping only the electrons
//! (Z⁰ → e⁺e⁻).
//!
//! Only the hard process is simulated: multi-parton interactions, initial and
//! final state radiation, and hadronization are all switched off. The invariant
//! mass of the decay pair should thus sit right on the resonance's lineshape.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program follows a simple pipeline:
//!
//! * read in the run parameters and configure the event generator
//! * loop over events, in independent batches,
//!     * generating an event record,
//!     * searching its final state for the channel's decay products,
//!     * filling histograms with the reconstructed quantities
//! * then display / store the result.
//!
//! The generator sits behind a trait, so that a test double or another
//! generator can replace the built-in parton-level one.

#![warn(missing_docs)]

mod channel;
mod config;
mod event;
mod evgen;
mod histogram;
mod momentum;
mod numeric;
mod output;
mod pipeline;
mod random;
mod reco;
mod resacc;
mod scheduling;
mod species;

use clap::Parser;
use eyre::WrapErr;
use log::info;

use crate::{
    config::{Args, Configuration},
    evgen::PartonLevelGenerator,
    output::OutputSink,
    pipeline::{setup_generator, simulate_events},
    scheduling::Batch,
};

use std::time::Instant;

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // ### CONFIGURATION READOUT ###

    let cfg = Configuration::from_args(Args::parse())
        .wrap_err("Failed to load the configuration")?;

    // ### SIMULATION INITIALIZATION ###

    // Configuration errors must surface before any event is generated, so we
    // first go through the generator setup once on the main thread
    setup_generator(&mut PartonLevelGenerator::new(), &cfg.channel, cfg.seed)
        .wrap_err("Failed to configure the event generator")?;

    // Output files are opened upfront for the same reason
    let sink = OutputSink::create(&cfg).wrap_err("Failed to prepare the output files")?;

    // NOTE: We start the clock after configuration I/O, to avoid IO-induced
    //       timing fluctuations
    let saved_time = Instant::now();

    // ### SIMULATION EXECUTION ###

    // This kernel simulates a batch of events with its own generator, seeded
    // from the batch index, and returns the accumulated intermediary results
    let simulate_batch = |batch: Batch| {
        let mut generator = PartonLevelGenerator::new();
        setup_generator(&mut generator, &cfg.channel, batch.seed(cfg.seed))?;
        simulate_events(&mut generator, &cfg.channel, batch, cfg.num_listed, cfg.missing)
    };

    // Run the simulation
    let result = scheduling::run_simulation(cfg.num_events, simulate_batch)?;

    // ### RESULTS DISPLAY AND STORAGE ###

    // Measure how much time has elapsed
    let elapsed_time = saved_time.elapsed();
    info!("Simulated {} events in {:?}", result.num_events(), elapsed_time);

    // Send the results to the standard output and to disk and we're done
    sink.dump_results(&cfg, &result, elapsed_time)
        .wrap_err("Failed to output the results")?;
    Ok(())
}
