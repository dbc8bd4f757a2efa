//! This module allows integrating reconstruction results across events

use crate::{channel::Channel, histogram::Histogram, reco::Reconstruction, Result};

use clap::ValueEnum;
use eyre::bail;
use serde::{Deserialize, Serialize};

use std::{fmt, str::FromStr};

/// What to do with events where a decay product could not be found
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingSpecies {
    /// Fill the histograms anyway, missing momenta counting as zero
    #[default]
    ZeroFill,

    /// Leave the event out of the histograms
    Skip,

    /// Abort the run
    Fail,
}
//
impl FromStr for MissingSpecies {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match <Self as ValueEnum>::from_str(s, true) {
            Ok(policy) => Ok(policy),
            Err(_) => bail!(
                "Unknown missing species policy {:?} (expected zero-fill, skip or fail)",
                s
            ),
        }
    }
}
//
impl fmt::Display for MissingSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ZeroFill => "zero-fill",
            Self::Skip => "skip",
            Self::Fail => "fail",
        };
        f.write_str(name)
    }
}

/// This struct accumulates the histograms and event counters of a run
#[derive(Clone, Debug, PartialEq)]
pub struct RunAccumulator {
    /// Policy for events with missing decay products
    policy: MissingSpecies,

    /// Invariant mass of the reconstructed parent
    mass: Histogram,

    /// Transverse momentum of the reconstructed particle
    pt: Option<Histogram>,

    /// Number of integrated events
    num_events: usize,

    /// Number of events where both decay products were found
    num_complete: usize,

    /// Number of events which were left out of the histograms
    num_skipped: usize,
}
//
impl RunAccumulator {
    /// Prepare for results integration
    pub fn new(channel: &Channel, policy: MissingSpecies) -> Self {
        Self {
            policy,
            mass: Histogram::new(&channel.mass_histogram),
            pt: channel.pt_histogram.as_ref().map(|(spec, _)| Histogram::new(spec)),
            num_events: 0,
            num_complete: 0,
            num_skipped: 0,
        }
    }

    /// Integrate the reconstruction of one event
    pub fn integrate(&mut self, reco: &Reconstruction) -> Result<()> {
        self.num_events += 1;
        if reco.is_complete() {
            self.num_complete += 1;
        } else {
            match self.policy {
                MissingSpecies::ZeroFill => {}
                MissingSpecies::Skip => {
                    self.num_skipped += 1;
                    return Ok(());
                }
                MissingSpecies::Fail => {
                    bail!("Decay product missing from {:?}", reco)
                }
            }
        }
        self.mass.fill(reco.invariant_mass());
        if let Some(pt) = &mut self.pt {
            pt.fill(reco.particle_pt());
        }
        Ok(())
    }

    /// Integrate results from another RunAccumulator
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(self.policy, other.policy, "Cannot merge runs with different policies");
        self.mass.merge(&other.mass);
        match (&mut self.pt, &other.pt) {
            (Some(pt), Some(other_pt)) => pt.merge(other_pt),
            (None, None) => {}
            _ => panic!("Cannot merge runs with different histograms"),
        }
        self.num_events += other.num_events;
        self.num_complete += other.num_complete;
        self.num_skipped += other.num_skipped;
    }

    /// Policy for events with missing decay products
    pub fn policy(&self) -> MissingSpecies {
        self.policy
    }

    /// Invariant mass histogram
    pub fn mass_histogram(&self) -> &Histogram {
        &self.mass
    }

    /// Transverse momentum histogram, if the channel has one
    pub fn pt_histogram(&self) -> Option<&Histogram> {
        self.pt.as_ref()
    }

    /// Number of integrated events
    pub fn num_events(&self) -> usize {
        self.num_events
    }

    /// Number of events where both decay products were found
    pub fn num_complete(&self) -> usize {
        self.num_complete
    }

    /// Number of events where a decay product was missing
    pub fn num_partial(&self) -> usize {
        self.num_events - self.num_complete
    }

    /// Number of events which were left out of the histograms
    pub fn num_skipped(&self) -> usize {
        self.num_skipped
    }
}
