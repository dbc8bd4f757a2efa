//! Reconstruction of a decayed parent particle from its final-state decay
//! products
//!
//! For each event, the final-state particles are scanned for one particle and
//! one antiparticle of a target species. Each match overwrites the previous
//! one, so the last particle of each kind wins. The parent 4-momentum is the
//! sum of the two.

use crate::{
    event::{Event, Particle},
    momentum::{self, Momentum},
    numeric::Float,
    species::Species,
};

use num_traits::Zero;

/// Outcome of the reconstruction of one event
#[derive(Clone, Debug, PartialEq)]
pub enum Reconstruction {
    /// Both decay products were found
    Complete {
        /// 4-momentum of the particle
        particle: Momentum,

        /// 4-momentum of the antiparticle
        antiparticle: Momentum,
    },

    /// At least one of the decay products is missing
    Partial {
        /// 4-momentum of the particle, if found
        particle: Option<Momentum>,

        /// 4-momentum of the antiparticle, if found
        antiparticle: Option<Momentum>,
    },
}
//
impl Reconstruction {
    /// Truth that both decay products were found
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Reconstructed parent 4-momentum, where missing decay products count as
    /// the zero vector
    pub fn parent(&self) -> Momentum {
        match self {
            Self::Complete {
                particle,
                antiparticle,
            } => particle + antiparticle,
            Self::Partial {
                particle,
                antiparticle,
            } => {
                let zero_fill = |slot: &Option<Momentum>| slot.unwrap_or_else(Momentum::zero);
                zero_fill(particle) + zero_fill(antiparticle)
            }
        }
    }

    /// Invariant mass of the reconstructed parent
    pub fn invariant_mass(&self) -> Float {
        momentum::invariant_mass(&self.parent())
    }

    /// Transverse momentum of the particle (zero if it's missing)
    pub fn particle_pt(&self) -> Float {
        match self {
            Self::Complete { particle, .. } | Self::Partial { particle: Some(particle), .. } => {
                momentum::transverse_momentum(particle)
            }
            Self::Partial { particle: None, .. } => 0.,
        }
    }
}

/// Particle and antiparticle slots, filled as an event is scanned
#[derive(Clone, Copy, Debug, Default)]
struct Slots {
    particle: Option<Momentum>,
    antiparticle: Option<Momentum>,
}
//
impl Slots {
    /// Record a particle if it's of the target species
    fn record(mut self, species: Species, part: &Particle) -> Self {
        if part.id == species {
            self.particle = Some(part.momentum);
        } else if part.id == -species {
            self.antiparticle = Some(part.momentum);
        }
        self
    }
}
//
impl From<Slots> for Reconstruction {
    fn from(slots: Slots) -> Self {
        match slots {
            Slots {
                particle: Some(particle),
                antiparticle: Some(antiparticle),
            } => Self::Complete {
                particle,
                antiparticle,
            },
            Slots {
                particle,
                antiparticle,
            } => Self::Partial {
                particle,
                antiparticle,
            },
        }
    }
}

/// Reconstruct the parent of a particle/antiparticle pair of some species,
/// from the final-state particles of an event
pub fn reconstruct(species: Species, event: &Event) -> Reconstruction {
    event
        .particles()
        .iter()
        .filter(|part| part.is_final())
        .fold(Slots::default(), |slots, part| slots.record(species, part))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::{STATUS_OUTGOING, STATUS_RESONANCE},
        momentum::{boost, from_e_p, Beta, E},
        species::{BOTTOM, ELECTRON, GLUON, HIGGS},
    };
    use approx::assert_relative_eq;

    fn final_particle(id: Species, p: Momentum) -> Particle {
        Particle::new(id, STATUS_OUTGOING, p)
    }

    fn b() -> Momentum {
        from_e_p(10.1, 10., 0., 0.)
    }

    fn bbar() -> Momentum {
        from_e_p(10.1, -10., 0., 0.)
    }

    #[test]
    fn back_to_back_pair() {
        let event =
            Event::from_iter([final_particle(BOTTOM, b()), final_particle(-BOTTOM, bbar())]);
        let reco = reconstruct(BOTTOM, &event);
        assert!(reco.is_complete());
        assert_eq!(reco.parent(), from_e_p(20.2, 0., 0., 0.));
        assert_relative_eq!(reco.invariant_mass(), 20.2, max_relative = 1e-6);
    }

    #[test]
    fn missing_particle_counts_as_zero() {
        let event = Event::from_iter([final_particle(-BOTTOM, bbar()), final_particle(GLUON, b())]);
        let reco = reconstruct(BOTTOM, &event);
        assert_eq!(
            reco,
            Reconstruction::Partial {
                particle: None,
                antiparticle: Some(bbar())
            }
        );
        assert_eq!(reco.parent(), bbar());
        assert_eq!(reco.particle_pt(), 0.);
    }

    #[test]
    fn empty_event_is_degenerate() {
        let reco = reconstruct(ELECTRON, &Event::default());
        assert!(!reco.is_complete());
        assert_eq!(reco.parent(), Momentum::zeros());
        assert_eq!(reco.invariant_mass(), 0.);
    }

    #[test]
    fn last_match_wins() {
        let first = from_e_p(50., 30., 40., 0.);
        let second = from_e_p(45., 0., 27., 36.);
        let positron = from_e_p(40., 0., 0., -40.);
        let event = Event::from_iter([
            final_particle(ELECTRON, first),
            final_particle(-ELECTRON, positron),
            final_particle(ELECTRON, second),
        ]);
        let reco = reconstruct(ELECTRON, &event);
        assert_eq!(reco.parent(), second + positron);
        assert_relative_eq!(reco.particle_pt(), 27.);
    }

    #[test]
    fn intermediate_particles_never_contribute() {
        let mut parts = vec![final_particle(BOTTOM, b()), final_particle(-BOTTOM, bbar())];
        let reference = reconstruct(BOTTOM, &parts.iter().cloned().collect());
        for status in [0, -1, -22, -62] {
            parts.push(Particle::new(BOTTOM, status, from_e_p(500., 1., 2., 3.)));
            parts.push(Particle::new(-BOTTOM, status, from_e_p(700., 3., 2., 1.)));
            parts.push(Particle::new(HIGGS, STATUS_RESONANCE, from_e_p(20.2, 0., 0., 0.)));
            // Whatever the position of the intermediate particles...
            let event = parts.iter().cloned().collect::<Event>();
            assert_eq!(reconstruct(BOTTOM, &event), reference);
            let event = parts.iter().rev().cloned().collect::<Event>();
            assert_eq!(reconstruct(BOTTOM, &event), reference);
        }
    }

    #[test]
    fn particle_order_does_not_matter() {
        let p1 = from_e_p(70., 12., -33., 50.);
        let p2 = from_e_p(60., -8., 30., -41.);
        let forward = Event::from_iter([final_particle(BOTTOM, p1), final_particle(-BOTTOM, p2)]);
        let backward = Event::from_iter([final_particle(-BOTTOM, p2), final_particle(BOTTOM, p1)]);
        let (reco_f, reco_b) = (reconstruct(BOTTOM, &forward), reconstruct(BOTTOM, &backward));
        assert_eq!(reco_f, reco_b);
        assert_eq!(reco_f.parent(), p2 + p1);
    }

    #[test]
    fn mass_is_boost_invariant() {
        let p1 = from_e_p(70., 12., -33., 50.);
        let p2 = from_e_p(60., -8., 30., -41.);
        let rest_mass = reconstruct(
            BOTTOM,
            &Event::from_iter([final_particle(BOTTOM, p1), final_particle(-BOTTOM, p2)]),
        )
        .invariant_mass();
        for beta in [
            Beta::new(0.5, 0., 0.),
            Beta::new(0., -0.9, 0.),
            Beta::new(0.1, 0.2, 0.95),
            Beta::new(-0.3, 0.3, -0.3),
        ] {
            let boosted = Event::from_iter([
                final_particle(BOTTOM, boost(&p1, &beta)),
                final_particle(-BOTTOM, boost(&p2, &beta)),
            ]);
            let reco = reconstruct(BOTTOM, &boosted);
            assert!(reco.parent()[E] > 0.);
            assert_relative_eq!(reco.invariant_mass(), rest_mass, max_relative = 1e-6);
        }
    }
}
