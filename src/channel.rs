//! Physics channels which the analysis knows how to reconstruct
//!
//! Both channels share the same pipeline and only differ by the constants
//! gathered here: generator settings, target species and histogram binnings.

use crate::{
    histogram::HistogramSpec,
    numeric::Float,
    species::{Species, BOTTOM, ELECTRON, PROTON},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Settings which switch off everything but the hard process
const HARD_PROCESS_ONLY: [&str; 4] = [
    "PartonLevel:MPI = off",
    "HadronLevel:Hadronize = off",
    "PartonLevel:ISR = off",
    "PartonLevel:FSR = off",
];

/// Selection of a physics channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// gg → H → b b̄
    Higgs,

    /// ff̄ → γ*/Z → e⁺e⁻
    Z,
}
//
impl ChannelKind {
    /// Full description of the channel
    pub fn channel(self) -> Channel {
        match self {
            Self::Higgs => Channel {
                kind: self,
                beams: [PROTON, PROTON],
                e_cm: 13_000.,
                process: &["HiggsSM:gg2H = on", "25:onMode = off", "25:onIfMatch = 5 -5"],
                target: BOTTOM,
                mass_histogram: HistogramSpec {
                    name: "invariant_H",
                    x_title: "m_{bbar} [GeV]",
                    y_title: "Entries",
                    num_bins: 50,
                    low: 124.9,
                    high: 125.1,
                },
                pt_histogram: None,
                default_events: 10_000,
                output_stem: "invariant_mass_bbar",
            },
            Self::Z => Channel {
                kind: self,
                beams: [PROTON, PROTON],
                e_cm: 13_000.,
                process: &["WeakSingleBoson:ffbar2gmZ = on"],
                target: ELECTRON,
                mass_histogram: HistogramSpec {
                    name: "invariant_mass_Zee",
                    x_title: "m_{ee} [GeV]",
                    y_title: "Entries",
                    num_bins: 100,
                    low: 80.,
                    high: 100.,
                },
                pt_histogram: Some((
                    HistogramSpec {
                        name: "electron_pT",
                        x_title: "p_{T} [GeV]",
                        y_title: "Entries",
                        num_bins: 100,
                        low: 0.,
                        high: 60.,
                    },
                    "e_pT",
                )),
                default_events: 100_000,
                output_stem: "invariant_mass_ee",
            },
        }
    }
}

/// Everything that distinguishes one reconstruction channel from another
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Which channel this is
    pub kind: ChannelKind,

    /// Colliding beam particles
    pub beams: [Species; 2],

    /// Center-of-mass energy (GeV)
    pub e_cm: Float,

    /// Generator settings selecting the hard process and its decays
    process: &'static [&'static str],

    /// Species whose particle/antiparticle pair is reconstructed
    pub target: Species,

    /// Invariant mass histogram
    pub mass_histogram: HistogramSpec,

    /// Transverse momentum histogram of the target particle, with the file
    /// stem of its image
    pub pt_histogram: Option<(HistogramSpec, &'static str)>,

    /// Number of events simulated unless told otherwise
    pub default_events: usize,

    /// File stem of the output files
    pub output_stem: &'static str,
}
//
impl Channel {
    /// Generator settings of this channel, in the order they must be applied
    pub fn generator_settings(&self, seed: u64) -> Vec<String> {
        self.process
            .iter()
            .chain(HARD_PROCESS_ONLY.iter())
            .map(|&s| s.to_owned())
            .chain([
                "Random:setSeed = on".to_owned(),
                format!("Random:seed = {}", seed),
            ])
            .collect()
    }
}
