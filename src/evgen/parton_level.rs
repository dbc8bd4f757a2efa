//! Parton-level resonance generator
//!
//! Produces the hard process of a proton-proton collision and nothing else:
//! two incoming partons fuse into a resonance whose mass follows a truncated
//! Breit-Wigner, with a longitudinal boost sampled uniformly in rapidity, and
//! the resonance decays isotropically into two bodies. There is no matrix
//! element or parton density weighting, so distributions are only
//! qualitatively right, but event records have the layout and the kinematic
//! properties (momentum conservation, on-shell decay products, resonance
//! line shape) that the analysis relies on.

use crate::{
    event::{Event, Particle, STATUS_BEAM, STATUS_INCOMING, STATUS_OUTGOING, STATUS_RESONANCE},
    evgen::{
        resonance::Resonance,
        settings::{Process, ProcessSettings, Setting},
        EventGenerator,
    },
    momentum::{self, from_e_p, on_shell},
    numeric::{floats::consts::PI, Float},
    random::RandomGenerator,
    species::{self, Species, BOTTOM, CHARM, DOWN, GLUON, PROTON, STRANGE, UP},
    Result,
};

use eyre::{bail, ensure, eyre, WrapErr};
use log::{info, warn};
use nalgebra::Vector3;
use prefix_num_ops::real::*;

/// Quark flavours which may annihilate into a γ*/Z
const ANNIHILATING_QUARKS: [Species; 5] = [DOWN, UP, STRANGE, CHARM, BOTTOM];

/// Generator of the hard process of resonance production
#[derive(Debug, Default)]
pub struct PartonLevelGenerator {
    /// Settings received so far
    settings: ProcessSettings,

    /// Event generation state, available once initialized
    run: Option<RunState>,

    /// Storage for the current event
    event: Event,
}
//
impl PartonLevelGenerator {
    /// Release of this generator
    pub const VERSION: u32 = 1_000;

    /// Create a generator in its default configuration
    pub fn new() -> Self {
        Self::default()
    }
}
//
impl EventGenerator for PartonLevelGenerator {
    fn version(&self) -> u32 {
        Self::VERSION
    }

    fn read_string(&mut self, setting: &str) -> Result<()> {
        ensure!(
            self.run.is_none(),
            "Setting {:?} was received after initialization",
            setting
        );
        let decoded = setting
            .parse::<Setting>()
            .wrap_err_with(|| format!("Generator rejected setting {:?}", setting))?;
        self.settings.apply(decoded);
        Ok(())
    }

    fn initialize(&mut self, beam_a: Species, beam_b: Species, e_cm: Float) -> Result<()> {
        ensure!(self.run.is_none(), "Generator was already initialized");

        // We simulate exactly one hard process
        let process = match self.settings.processes[..] {
            [process] => process,
            [] => bail!("No hard process was switched on"),
            _ => bail!("Only one hard process may be switched on at a time"),
        };

        // ...and nothing else
        let effects = self.settings.enabled_effects();
        ensure!(
            effects.is_empty(),
            "A parton-level generator cannot simulate {}, please switch it off",
            effects.join(", ")
        );

        // Both processes are initiated by partons from (anti)protons
        for beam in [beam_a, beam_b] {
            ensure!(
                beam.abs() == PROTON,
                "Unsupported beam particle {}",
                species::name(beam)
            );
        }
        ensure!(e_cm > 0., "Collision energy must be positive");

        // Set up the resonance decay table and mass window
        let mut resonance = match process {
            Process::GluonFusionHiggs => Resonance::higgs(),
            Process::FermionPairToGammaZ => Resonance::z0(),
        };
        for change in &self.settings.resonance_changes {
            if !resonance.apply(change)? {
                warn!("Ignoring {:?}, which targets a particle that is not produced", change);
            }
        }
        resonance.check(e_cm)?;

        let seed = self.settings.effective_seed();
        info!(
            "Initialized {:?} in {} {} collisions at {} GeV (seed {})",
            process,
            species::name(beam_a),
            species::name(beam_b),
            e_cm,
            seed
        );
        self.run = Some(RunState {
            process,
            beams: [beam_a, beam_b],
            e_cm,
            resonance,
            rng: RandomGenerator::new(seed),
        });
        Ok(())
    }

    fn generate_event(&mut self) -> Result<&Event> {
        let run = self
            .run
            .as_mut()
            .ok_or_else(|| eyre!("Generator must be initialized before generating events"))?;
        run.generate(&mut self.event);
        Ok(&self.event)
    }
}

/// Everything that is needed to generate events after initialization
#[derive(Debug)]
struct RunState {
    /// Hard process
    process: Process,

    /// Beam particles
    beams: [Species; 2],

    /// Center-of-mass energy (GeV)
    e_cm: Float,

    /// Produced resonance
    resonance: Resonance,

    /// Random number generator
    rng: RandomGenerator,
}
//
impl RunState {
    /// Fill an event record with a new event
    fn generate(&mut self, event: &mut Event) {
        event.clear();
        let half_e = self.e_cm / 2.;

        // Decide how the resonance decays, and what its mass is
        let channel = self.resonance.pick_channel(self.e_cm, &mut self.rng);
        let m_res = self.resonance.sample_mass(channel, self.e_cm, &mut self.rng);
        let products = channel.products;

        // Beams travel along the Z axis
        let p_beam = sqrt(half_e * half_e - species::mass(PROTON).powi(2));
        let beam_1 = event.push(Particle::new(
            self.beams[0],
            STATUS_BEAM,
            from_e_p(half_e, 0., 0., p_beam),
        ));
        let beam_2 = event.push(Particle::new(
            self.beams[1],
            STATUS_BEAM,
            from_e_p(half_e, 0., 0., -p_beam),
        ));

        // Share the resonance mass between the incoming partons: x1·x2 = τ and
        // the resonance rapidity is uniform over the allowed range
        let tau = (m_res / self.e_cm).powi(2);
        let y_max = -0.5 * ln(tau);
        let y = self.rng.uniform(-y_max, y_max);
        let x_1 = sqrt(tau) * exp(y);
        let x_2 = sqrt(tau) * exp(-y);
        let p_1 = from_e_p(x_1 * half_e, 0., 0., x_1 * half_e);
        let p_2 = from_e_p(x_2 * half_e, 0., 0., -x_2 * half_e);
        let [id_1, id_2] = self.incoming_partons();
        let parton_1 =
            event.push(Particle::new(id_1, STATUS_INCOMING, p_1).with_mothers(beam_1, 0));
        let parton_2 =
            event.push(Particle::new(id_2, STATUS_INCOMING, p_2).with_mothers(beam_2, 0));

        // Produce the resonance
        let p_res = p_1 + p_2;
        let res = event.push(
            Particle::new(self.resonance.id, STATUS_RESONANCE, p_res)
                .with_mothers(parton_1, parton_2),
        );

        // Isotropic two-body decay in the resonance rest frame...
        let [m_1, m_2] = products.map(species::mass);
        let lambda = (m_res.powi(2) - (m_1 + m_2).powi(2)) * (m_res.powi(2) - (m_1 - m_2).powi(2));
        let p_star = sqrt(lambda.max(0.)) / (2. * m_res);
        let cos_theta = self.rng.uniform(-1., 1.);
        let sin_theta = sqrt(1. - cos_theta * cos_theta);
        let phi = self.rng.uniform(0., 2. * PI);
        let dir = Vector3::new(sin_theta * cos(phi), sin_theta * sin(phi), cos_theta);

        // ...boosted to the laboratory frame
        let beta = momentum::beta(&p_res);
        for (id, mass, p) in [(products[0], m_1, dir * p_star), (products[1], m_2, -dir * p_star)] {
            let p_lab = momentum::boost(&on_shell(mass, p), &beta);
            event.push(Particle::new(id, STATUS_OUTGOING, p_lab).with_mothers(res, 0));
        }
    }

    /// Species of the partons which initiate the hard process
    fn incoming_partons(&mut self) -> [Species; 2] {
        match self.process {
            Process::GluonFusionHiggs => [GLUON, GLUON],
            Process::FermionPairToGammaZ => {
                let [r_flavour, r_side] = self.rng.random_array::<2>();
                let idx = ((r_flavour * ANNIHILATING_QUARKS.len() as Float) as usize)
                    .min(ANNIHILATING_QUARKS.len() - 1);
                let quark = ANNIHILATING_QUARKS[idx];
                if r_side < 0.5 {
                    [quark, -quark]
                } else {
                    [-quark, quark]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::Event,
        momentum::{invariant_mass, E},
        species::{BOTTOM, ELECTRON, HIGGS, Z0},
    };
    use approx::assert_relative_eq;

    const NO_EXTRAS: [&str; 4] = [
        "PartonLevel:MPI = off",
        "HadronLevel:Hadronize = off",
        "PartonLevel:ISR = off",
        "PartonLevel:FSR = off",
    ];

    fn generator(settings: &[&str]) -> Result<PartonLevelGenerator> {
        let mut gen = PartonLevelGenerator::new();
        for setting in settings.iter().chain(NO_EXTRAS.iter()) {
            gen.read_string(setting)?;
        }
        gen.initialize(PROTON, PROTON, 13_000.)?;
        Ok(gen)
    }

    fn higgs_to_bbar() -> PartonLevelGenerator {
        generator(&["HiggsSM:gg2H = on", "25:onMode = off", "25:onIfMatch = 5 -5"])
            .expect("Higgs configuration should be accepted")
    }

    #[test]
    fn record_layout() {
        let mut gen = higgs_to_bbar();
        let event = gen.generate_event().unwrap();
        let summary = event
            .particles()
            .iter()
            .map(|p| (p.id, p.status))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (PROTON, STATUS_BEAM),
                (PROTON, STATUS_BEAM),
                (GLUON, STATUS_INCOMING),
                (GLUON, STATUS_INCOMING),
                (HIGGS, STATUS_RESONANCE),
                (BOTTOM, STATUS_OUTGOING),
                (-BOTTOM, STATUS_OUTGOING),
            ]
        );
        assert_eq!(event.particles()[4].mothers, [3, 4]);
        assert_eq!(event.particles()[6].mothers, [5, 0]);
    }

    #[test]
    fn decay_conserves_momentum() {
        let mut gen = higgs_to_bbar();
        for _ in 0..100 {
            let event = gen.generate_event().unwrap();
            let parts = event.particles();
            let resonance = parts[4].momentum;
            let sum = parts[5].momentum + parts[6].momentum;
            assert_relative_eq!(sum, resonance, epsilon = 1e-6 * resonance[E]);
            assert_relative_eq!(parts[5].mass(), 4.8, max_relative = 1e-4);
            assert_relative_eq!(
                invariant_mass(&sum),
                invariant_mass(&resonance),
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn higgs_mass_is_narrow() {
        let mut gen = higgs_to_bbar();
        let in_window = (0..1000)
            .filter(|_| {
                let event = gen.generate_event().unwrap();
                (124.9..125.1).contains(&event.particles()[4].mass())
            })
            .count();
        assert!(in_window > 950, "Only {} events in the mass window", in_window);
    }

    #[test]
    fn z_decays_follow_the_table() {
        let mut gen = generator(&["WeakSingleBoson:ffbar2gmZ = on"]).unwrap();
        let mut electrons = 0;
        for _ in 0..10_000 {
            let event = gen.generate_event().unwrap();
            let parts = event.particles();
            assert_eq!(parts[4].id, Z0);
            assert_eq!(parts[2].id, -parts[3].id);
            if parts[5].id == ELECTRON {
                electrons += 1;
            }
        }
        // Branching ratio is ~3.4%
        assert!((200..500).contains(&electrons), "{} electrons", electrons);
    }

    #[test]
    fn same_seed_same_events() {
        let settings = ["HiggsSM:gg2H = on", "Random:setSeed = on", "Random:seed = 7"];
        let mut gen1 = generator(&settings).unwrap();
        let mut gen2 = generator(&settings).unwrap();
        for _ in 0..10 {
            let event1: Event = gen1.generate_event().unwrap().clone();
            assert_eq!(&event1, gen2.generate_event().unwrap());
        }
    }

    #[test]
    fn configuration_errors() {
        // Nothing to simulate
        assert!(generator(&[]).is_err());
        // Too much to simulate
        assert!(generator(&["HiggsSM:gg2H = on", "WeakSingleBoson:ffbar2gmZ = on"]).is_err());
        // Effects which cannot be simulated
        let mut gen = PartonLevelGenerator::new();
        gen.read_string("HiggsSM:gg2H = on").unwrap();
        let err = gen.initialize(PROTON, PROTON, 13_000.).unwrap_err();
        assert!(err.to_string().contains("PartonLevel:MPI"));
        // Unknown settings
        let mut gen = PartonLevelGenerator::new();
        assert!(gen.read_string("HiggsSM:gg2H = sure").is_err());
        assert!(gen.read_string("Foo:bar = on").is_err());
        // Bad beams
        let mut gen = PartonLevelGenerator::new();
        for setting in ["HiggsSM:gg2H = on"].iter().chain(NO_EXTRAS.iter()) {
            gen.read_string(setting).unwrap();
        }
        assert!(gen.initialize(ELECTRON, -ELECTRON, 13_000.).is_err());
    }

    #[test]
    fn lifecycle_is_enforced() {
        let mut gen = PartonLevelGenerator::new();
        assert!(gen.generate_event().is_err());
        let mut gen = higgs_to_bbar();
        assert!(gen.read_string("PartonLevel:ISR = on").is_err());
        assert!(gen.initialize(PROTON, PROTON, 13_000.).is_err());
    }
}
