//! The per-event analysis loop, shared by all channels

use crate::{
    channel::Channel,
    evgen::{self, EventGenerator},
    reco,
    resacc::{MissingSpecies, RunAccumulator},
    scheduling::Batch,
    Result,
};

use eyre::WrapErr;
use log::debug;

/// Configure and initialize an event generator for a channel
///
/// This must be done exactly once per generator, before any event is
/// generated. Any rejected setting aborts the setup.
///
pub fn setup_generator<G: EventGenerator>(
    generator: &mut G,
    channel: &Channel,
    seed: u64,
) -> Result<()> {
    evgen::ensure_supported_version(generator)?;
    for setting in channel.generator_settings(seed) {
        generator.read_string(&setting)?;
    }
    let [beam_a, beam_b] = channel.beams;
    generator
        .initialize(beam_a, beam_b, channel.e_cm)
        .wrap_err("Failed to initialize the event generator")
}

/// Generate and analyze a batch of events with an initialized generator
///
/// The full record of the events of the run whose index is below `num_listed`
/// is printed out, for inspection.
///
pub fn simulate_events<G: EventGenerator>(
    generator: &mut G,
    channel: &Channel,
    batch: Batch,
    num_listed: usize,
    policy: MissingSpecies,
) -> Result<RunAccumulator> {
    let mut accumulator = RunAccumulator::new(channel, policy);
    for event_idx in batch.first_event..batch.first_event + batch.num_events {
        let event = generator
            .generate_event()
            .wrap_err_with(|| format!("Failed to generate event {}", event_idx))?;
        if event_idx < num_listed {
            println!("Event {} ({} particles)", event_idx, event.particles().len());
            println!("{}", event);
        }
        let reconstruction = reco::reconstruct(channel.target, event);
        accumulator
            .integrate(&reconstruction)
            .wrap_err_with(|| format!("Failed to integrate event {}", event_idx))?;
    }
    debug!(
        "Batch {}: {} events, {} partial",
        batch.index,
        accumulator.num_events(),
        accumulator.num_partial()
    );
    Ok(accumulator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::ChannelKind,
        event::{Event, Particle, STATUS_BEAM, STATUS_OUTGOING, STATUS_RESONANCE},
        evgen::{mock::ReplayGenerator, PartonLevelGenerator},
        momentum::{from_e_p, on_shell},
        numeric::Float,
        species::{self, ELECTRON, PROTON, Z0},
    };
    use nalgebra::Vector3;

    /// Z → e⁺e⁻ event at rest with a given mass, decaying along an axis
    fn z_event(mass: Float) -> Event {
        let half = mass / 2.;
        let m_e = species::mass(ELECTRON);
        let p = (half * half - m_e * m_e).sqrt();
        Event::from_iter([
            Particle::new(PROTON, STATUS_BEAM, from_e_p(6_500., 0., 0., 6_500.)),
            Particle::new(Z0, STATUS_RESONANCE, from_e_p(mass, 0., 0., 0.)),
            Particle::new(ELECTRON, STATUS_OUTGOING, on_shell(m_e, Vector3::new(p, 0., 0.))),
            Particle::new(-ELECTRON, STATUS_OUTGOING, on_shell(m_e, Vector3::new(-p, 0., 0.))),
        ])
    }

    fn batch(num_events: usize) -> Batch {
        Batch {
            index: 0,
            first_event: 0,
            num_events,
        }
    }

    #[test]
    fn setup_sends_channel_settings() {
        let channel = ChannelKind::Z.channel();
        let mut gen = ReplayGenerator::new(vec![Event::default()]);
        setup_generator(&mut gen, &channel, 5).unwrap();
        assert_eq!(gen.settings, channel.generator_settings(5));
        assert_eq!(gen.initialized, Some((PROTON, PROTON, 13_000.)));
    }

    #[test]
    fn setup_refuses_broken_generators() {
        let mut gen = ReplayGenerator::new(vec![Event::default()]);
        gen.version = 8_235;
        assert!(setup_generator(&mut gen, &ChannelKind::Z.channel(), 5).is_err());
        assert!(gen.settings.is_empty());
        assert!(gen.initialized.is_none());
    }

    #[test]
    fn deterministic_z_run() {
        let channel = ChannelKind::Z.channel();
        let masses = [85.15, 91.25, 91.35, 97.75];
        let mut gen = ReplayGenerator::new(masses.iter().map(|&m| z_event(m)).collect());
        setup_generator(&mut gen, &channel, 1).unwrap();
        let num_events = 1_000;
        let result =
            simulate_events(&mut gen, &channel, batch(num_events), 0, MissingSpecies::Fail)
                .unwrap();
        assert_eq!(gen.generated, num_events);
        assert_eq!(result.num_complete(), num_events);

        let mass = result.mass_histogram();
        assert_eq!(mass.entries() as usize, num_events);
        for (bin, &count) in mass.bins().iter().enumerate() {
            let expected = masses.iter().filter(|&&m| mass.find_bin(m) == Some(bin)).count();
            assert_eq!(count as usize, expected * num_events / masses.len(), "bin {}", bin);
        }

        // Decays at rest along X give pT = m/2 (roughly)
        let pt = result.pt_histogram().unwrap();
        assert_eq!(pt.entries() as usize, num_events);
        assert!(pt.bins()[..70].iter().all(|&c| c == 0));
    }

    #[test]
    fn missing_electrons_follow_policy() {
        let channel = ChannelKind::Z.channel();
        let no_electron: Event = z_event(91.2)
            .particles()
            .iter()
            .filter(|p| p.id != ELECTRON)
            .cloned()
            .collect();
        let events = vec![z_event(91.2), no_electron];

        let mut gen = ReplayGenerator::new(events.clone());
        setup_generator(&mut gen, &channel, 1).unwrap();
        let skipped =
            simulate_events(&mut gen, &channel, batch(10), 0, MissingSpecies::Skip).unwrap();
        assert_eq!((skipped.num_partial(), skipped.num_skipped()), (5, 5));
        assert_eq!(skipped.mass_histogram().entries(), 5);

        let mut gen = ReplayGenerator::new(events);
        setup_generator(&mut gen, &channel, 1).unwrap();
        let failed = simulate_events(&mut gen, &channel, batch(10), 0, MissingSpecies::Fail);
        assert!(failed.is_err());
    }

    #[test]
    fn failures_report_the_run_event_index() {
        let channel = ChannelKind::Z.channel();
        let mut gen = ReplayGenerator::new(vec![Event::default()]);
        setup_generator(&mut gen, &channel, 1).unwrap();
        let late_batch = Batch {
            index: 3,
            first_event: 30_000,
            num_events: 10,
        };
        let err = simulate_events(&mut gen, &channel, late_batch, 0, MissingSpecies::Fail)
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to integrate event 30000");
        assert!(err.root_cause().to_string().contains("Decay product missing"));
    }

    #[test]
    fn higgs_peak_with_parton_level_generator() {
        let channel = ChannelKind::Higgs.channel();
        let mut gen = PartonLevelGenerator::new();
        setup_generator(&mut gen, &channel, 42).unwrap();
        let result =
            simulate_events(&mut gen, &channel, batch(2_000), 1, MissingSpecies::Fail).unwrap();
        assert_eq!(result.num_complete(), 2_000);
        let mass = result.mass_histogram();
        assert!(mass.entries() > 1_900, "{} entries in the peak", mass.entries());
        let peak = (mass.bins().iter().enumerate())
            .max_by_key(|&(_, &count)| count)
            .map(|(bin, _)| bin)
            .unwrap();
        assert!((20..30).contains(&peak), "Peak in bin {}", peak);
    }

    #[test]
    fn z_run_with_parton_level_generator() {
        let channel = ChannelKind::Z.channel();
        let mut gen = PartonLevelGenerator::new();
        setup_generator(&mut gen, &channel, 42).unwrap();
        let result =
            simulate_events(&mut gen, &channel, batch(5_000), 0, MissingSpecies::Skip).unwrap();
        // Only a few percent of Z bosons decay to electrons
        assert!(result.num_complete() < 500);
        assert_eq!(result.num_complete() + result.num_skipped(), 5_000);
        assert_eq!(
            result.pt_histogram().unwrap().entries() as usize,
            result.num_complete()
        );
    }

    #[test]
    fn rejected_settings_stop_setup() {
        let channel = ChannelKind::Higgs.channel();
        let mut gen = PartonLevelGenerator::new();
        gen.read_string("HiggsSM:gg2H = on").unwrap();
        assert!(gen.initialize(PROTON, PROTON, 13_000.).is_err());
        let mut gen = PartonLevelGenerator::new();
        gen.read_string("PartonLevel:MPI = off").unwrap();
        setup_generator(&mut gen, &channel, 1).unwrap();
        assert!(gen.read_string("PartonLevel:MPI = on").is_err());
    }
}
