//! Parsing of the string settings which configure event generation
//!
//! Settings follow the `Key = value` convention of the usual event generators:
//! keys are case-insensitive, whitespace around `=` is optional, and flags
//! accept on/off, true/false, yes/no or 1/0.

use crate::{numeric::Float, species::Species, Result};

use eyre::{bail, ensure, eyre, WrapErr};

use std::str::FromStr;

/// Hard processes that the generator knows about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Process {
    /// Gluon fusion to a Standard Model Higgs boson (gg → H)
    GluonFusionHiggs,

    /// Fermion pair annihilation to a virtual photon or Z (ff̄ → γ*/Z)
    FermionPairToGammaZ,
}

/// Auxiliary effects which may be switched on top of the hard process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Multi-parton interactions
    MultiPartonInteraction,

    /// Initial-state radiation
    InitialStateRadiation,

    /// Final-state radiation
    FinalStateRadiation,

    /// Hadronization of coloured partons
    Hadronization,
}

/// Alteration of the decay table of a resonance
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecayMode {
    /// Switch all channels on or off
    All(bool),

    /// Switch on the channels whose products match these species
    OnIfMatch(Vec<Species>),

    /// Switch off the channels whose products match these species
    OffIfMatch(Vec<Species>),
}

/// Bound of the mass window of a resonance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MassBound {
    /// Lower bound (`mMin`)
    Min,

    /// Upper bound (`mMax`)
    Max,
}

/// One decoded generator setting
#[derive(Clone, Debug, PartialEq)]
pub enum Setting {
    /// Enable or disable a hard process
    Process(Process, bool),

    /// Enable or disable an auxiliary effect
    Effect(Effect, bool),

    /// Whether the seed from `Random:seed` should be used
    SetSeed(bool),

    /// Seed of the random number generator
    Seed(u64),

    /// Change which decay channels of a resonance are open
    Decay(Species, DecayMode),

    /// Change the mass window of a resonance
    MassRange(Species, MassBound, Float),
}
//
impl FromStr for Setting {
    type Err = eyre::Report;

    fn from_str(setting: &str) -> Result<Self> {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| eyre!("Setting {:?} is not of the form Key = value", setting))?;
        let key = key.trim().to_lowercase();
        let value = value.trim();
        ensure!(!value.is_empty(), "Setting {:?} has no value", setting);
        let (group, name) = key
            .split_once(':')
            .ok_or_else(|| eyre!("Setting key {:?} has no Group:name form", key))?;

        let decoded = match (group, name) {
            ("higgssm", "gg2h") => Setting::Process(Process::GluonFusionHiggs, parse_flag(value)?),
            ("weaksingleboson", "ffbar2gmz") => {
                Setting::Process(Process::FermionPairToGammaZ, parse_flag(value)?)
            }
            ("partonlevel", "mpi") => {
                Setting::Effect(Effect::MultiPartonInteraction, parse_flag(value)?)
            }
            ("partonlevel", "isr") => {
                Setting::Effect(Effect::InitialStateRadiation, parse_flag(value)?)
            }
            ("partonlevel", "fsr") => {
                Setting::Effect(Effect::FinalStateRadiation, parse_flag(value)?)
            }
            ("hadronlevel", "hadronize") => {
                Setting::Effect(Effect::Hadronization, parse_flag(value)?)
            }
            ("random", "setseed") => Setting::SetSeed(parse_flag(value)?),
            ("random", "seed") => Setting::Seed(
                value
                    .parse()
                    .wrap_err_with(|| format!("Invalid random seed {:?}", value))?,
            ),
            (particle, property) => {
                let id = particle
                    .parse::<Species>()
                    .map_err(|_| eyre!("Unknown setting {:?}", key))?;
                match property {
                    "onmode" => Setting::Decay(id, DecayMode::All(parse_flag(value)?)),
                    "onifmatch" => Setting::Decay(id, DecayMode::OnIfMatch(parse_ids(value)?)),
                    "offifmatch" => Setting::Decay(id, DecayMode::OffIfMatch(parse_ids(value)?)),
                    "mmin" => Setting::MassRange(id, MassBound::Min, parse_float(value)?),
                    "mmax" => Setting::MassRange(id, MassBound::Max, parse_float(value)?),
                    _ => bail!("Unknown property {:?} of particle {}", property, id),
                }
            }
        };
        Ok(decoded)
    }
}

/// Parse a boolean flag in any of the spellings that generators accept
fn parse_flag(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => bail!("Invalid flag value {:?}", value),
    }
}

/// Parse a whitespace-separated list of species
fn parse_ids(value: &str) -> Result<Vec<Species>> {
    value
        .split_whitespace()
        .map(|id| {
            id.parse::<Species>()
                .wrap_err_with(|| format!("Invalid particle code {:?}", id))
        })
        .collect()
}

/// Parse a real number
fn parse_float(value: &str) -> Result<Float> {
    value
        .parse::<Float>()
        .wrap_err_with(|| format!("Invalid number {:?}", value))
}

/// Generator state resulting from a sequence of settings
#[derive(Clone, Debug)]
pub struct ProcessSettings {
    /// Hard processes which are switched on
    pub processes: Vec<Process>,

    /// Multi-parton interactions (on by default)
    pub mpi: bool,

    /// Initial-state radiation (on by default)
    pub isr: bool,

    /// Final-state radiation (on by default)
    pub fsr: bool,

    /// Hadronization (on by default)
    pub hadronize: bool,

    /// Whether `seed` should be used instead of the default seed
    pub set_seed: bool,

    /// User-provided seed
    pub seed: u64,

    /// Decay table and mass window changes, in the order they were requested
    pub resonance_changes: Vec<Setting>,
}
//
impl ProcessSettings {
    /// Seed which is used when none was explicitly requested
    pub const DEFAULT_SEED: u64 = 19_780_503;

    /// Record the effect of a setting
    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::Process(process, on) => {
                self.processes.retain(|&p| p != process);
                if on {
                    self.processes.push(process);
                }
            }
            Setting::Effect(Effect::MultiPartonInteraction, on) => self.mpi = on,
            Setting::Effect(Effect::InitialStateRadiation, on) => self.isr = on,
            Setting::Effect(Effect::FinalStateRadiation, on) => self.fsr = on,
            Setting::Effect(Effect::Hadronization, on) => self.hadronize = on,
            Setting::SetSeed(on) => self.set_seed = on,
            Setting::Seed(seed) => self.seed = seed,
            change @ (Setting::Decay(..) | Setting::MassRange(..)) => {
                self.resonance_changes.push(change)
            }
        }
    }

    /// Seed which the random number generator should start from
    pub fn effective_seed(&self) -> u64 {
        if self.set_seed {
            self.seed
        } else {
            Self::DEFAULT_SEED
        }
    }

    /// Names of the enabled effects that a parton-level generator can't model
    pub fn enabled_effects(&self) -> Vec<&'static str> {
        [
            (self.mpi, "PartonLevel:MPI"),
            (self.isr, "PartonLevel:ISR"),
            (self.fsr, "PartonLevel:FSR"),
            (self.hadronize, "HadronLevel:Hadronize"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}
//
impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            processes: Vec::new(),
            mpi: true,
            isr: true,
            fsr: true,
            hadronize: true,
            set_seed: false,
            seed: Self::DEFAULT_SEED,
            resonance_changes: Vec::new(),
        }
    }
}
