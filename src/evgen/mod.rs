//! This module provides event generation facilities
//!
//! Event generators are driven through the [`EventGenerator`] trait, which
//! follows the configure → initialize → generate lifecycle of the usual
//! physics generators. A parton-level resonance generator is provided.

mod parton_level;
mod resonance;
pub mod settings;

pub use self::parton_level::PartonLevelGenerator;

use crate::{event::Event, numeric::Float, species::Species, Result};

use eyre::ensure;

/// Generator releases which are known to crash with memory errors
pub const KNOWN_BROKEN_VERSIONS: &[u32] = &[8235];

/// Interface to a physics event generator
pub trait EventGenerator {
    /// Release of the generator, encoded as `major * 1000 + minor`
    fn version(&self) -> u32;

    /// Apply one `Key = value` setting. Must be called before initialize().
    fn read_string(&mut self, setting: &str) -> Result<()>;

    /// Prepare for event generation from collisions of two beams at a given
    /// center-of-mass energy (GeV)
    fn initialize(&mut self, beam_a: Species, beam_b: Species, e_cm: Float) -> Result<()>;

    /// Generate the next event
    ///
    /// The event storage is owned by the generator and reused from one call
    /// to the next, so the previous event is invalidated.
    ///
    fn generate_event(&mut self) -> Result<&Event>;
}

/// Refuse to use generator releases which are known to be broken
pub fn ensure_supported_version(generator: &impl EventGenerator) -> Result<()> {
    let version = generator.version();
    ensure!(
        !KNOWN_BROKEN_VERSIONS.contains(&version),
        "Generator release {}.{:03} is known to crash with memory errors, please use another one",
        version / 1000,
        version % 1000
    );
    Ok(())
}

#[cfg(test)]
pub mod mock {
    //! Deterministic generators for testing the analysis machinery

    use super::*;

    /// Generator which replays a fixed list of events in a loop
    pub struct ReplayGenerator {
        /// Events to be replayed
        pub events: Vec<Event>,

        /// Settings which were received
        pub settings: Vec<String>,

        /// Beams and energy which the generator was initialized with
        pub initialized: Option<(Species, Species, Float)>,

        /// Version to be reported
        pub version: u32,

        /// Number of events generated so far
        pub generated: usize,
    }
    //
    impl ReplayGenerator {
        /// Set up replay of a list of events
        pub fn new(events: Vec<Event>) -> Self {
            assert!(!events.is_empty(), "Need at least one event to replay");
            Self {
                events,
                settings: Vec::new(),
                initialized: None,
                version: 8_310,
                generated: 0,
            }
        }
    }
    //
    impl EventGenerator for ReplayGenerator {
        fn version(&self) -> u32 {
            self.version
        }

        fn read_string(&mut self, setting: &str) -> Result<()> {
            self.settings.push(setting.to_owned());
            Ok(())
        }

        fn initialize(&mut self, beam_a: Species, beam_b: Species, e_cm: Float) -> Result<()> {
            self.initialized = Some((beam_a, beam_b, e_cm));
            Ok(())
        }

        fn generate_event(&mut self) -> Result<&Event> {
            ensure!(self.initialized.is_some(), "Generator is not initialized");
            let idx = self.generated % self.events.len();
            self.generated += 1;
            Ok(&self.events[idx])
        }
    }

    #[test]
    fn version_gate() {
        let mut gen = ReplayGenerator::new(vec![Event::default()]);
        assert!(ensure_supported_version(&gen).is_ok());
        gen.version = 8_235;
        let err = ensure_supported_version(&gen).unwrap_err();
        assert!(err.to_string().contains("8.235"));
    }
}
