//! This module defines the properties and storage of generated events

use crate::{
    momentum::{self, Momentum, E, X, Y, Z},
    numeric::Float,
    species::{self, Species},
};
use std::fmt::{self, Display};

/// Status of the beam particles
pub const STATUS_BEAM: i32 = -12;

/// Status of the incoming partons of the hard process
pub const STATUS_INCOMING: i32 = -21;

/// Status of the intermediate resonance of the hard process
pub const STATUS_RESONANCE: i32 = -22;

/// Status of the outgoing particles of the hard process
pub const STATUS_OUTGOING: i32 = 23;

/// One entry of the event record
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Species of the particle
    pub id: Species,

    /// Positive for final-state particles, non-positive for intermediate ones
    pub status: i32,

    /// Record indices of the mothers (0 means none)
    pub mothers: [usize; 2],

    /// 4-momentum (GeV)
    pub momentum: Momentum,
}
//
impl Particle {
    /// Build a particle with no recorded mothers
    pub fn new(id: Species, status: i32, momentum: Momentum) -> Self {
        Self {
            id,
            status,
            mothers: [0, 0],
            momentum,
        }
    }

    /// Record the mothers of this particle
    pub fn with_mothers(mut self, first: usize, last: usize) -> Self {
        self.mothers = [first, last];
        self
    }

    /// Truth that this is a stable final-state particle
    pub fn is_final(&self) -> bool {
        self.status > 0
    }

    /// Invariant mass
    pub fn mass(&self) -> Float {
        momentum::invariant_mass(&self.momentum)
    }
}

/// Storage for the particles of one generated event
///
/// Record indices start at 1, index 0 is reserved to mean "no particle".
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event(Vec<Particle>);
//
impl Event {
    /// Forget all particles, keeping the allocation around for the next event
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Append a particle, returning its record index
    pub fn push(&mut self, particle: Particle) -> usize {
        self.0.push(particle);
        self.0.len()
    }

    /// Access the particles in record order
    pub fn particles(&self) -> &[Particle] {
        &self.0[..]
    }

    /// Sum of the 4-momenta of the final-state particles
    pub fn final_state_momentum(&self) -> Momentum {
        self.0
            .iter()
            .filter(|p| p.is_final())
            .map(|p| p.momentum)
            .sum()
    }
}

impl FromIterator<Particle> for Event {
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for Event {
    /// Dump the event record as a table
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            fmt,
            "{:>5} {:>6} {:<10} {:>6} {:>9} {:>12} {:>12} {:>12} {:>12} {:>10}",
            "no", "id", "name", "status", "mothers", "px", "py", "pz", "e", "m"
        )?;
        for (idx, part) in self.0.iter().enumerate() {
            let p = &part.momentum;
            writeln!(
                fmt,
                "{:>5} {:>6} {:<10} {:>6} {:>4} {:>4} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>10.3}",
                idx + 1,
                part.id,
                species::name(part.id),
                part.status,
                part.mothers[0],
                part.mothers[1],
                p[X],
                p[Y],
                p[Z],
                p[E],
                part.mass(),
            )?;
        }
        let sum = self.final_state_momentum();
        writeln!(
            fmt,
            "{:>5} {:>6} {:<10} {:>6} {:>9} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>10.3}",
            "",
            "",
            "sum",
            "",
            "",
            sum[X],
            sum[Y],
            sum[Z],
            sum[E],
            momentum::invariant_mass(&sum),
        )
    }
}
