//! Particle species, identified by their signed PDG codes

#![allow(missing_docs)]

use crate::numeric::Float;

/// Signed particle identity code (negative for antiparticles)
pub type Species = i32;

pub const DOWN: Species = 1;
pub const UP: Species = 2;
pub const STRANGE: Species = 3;
pub const CHARM: Species = 4;
pub const BOTTOM: Species = 5;
pub const ELECTRON: Species = 11;
pub const NU_E: Species = 12;
pub const MUON: Species = 13;
pub const NU_MU: Species = 14;
pub const TAU: Species = 15;
pub const NU_TAU: Species = 16;
pub const GLUON: Species = 21;
pub const PHOTON: Species = 22;
pub const Z0: Species = 23;
pub const HIGGS: Species = 25;
pub const PROTON: Species = 2212;

/// Rest mass of a species (GeV), using the usual generator defaults
///
/// Unknown species are treated as massless.
///
pub fn mass(id: Species) -> Float {
    match id.abs() {
        DOWN | UP => 0.33,
        STRANGE => 0.5,
        CHARM => 1.5,
        BOTTOM => 4.8,
        ELECTRON => 0.000_510_999,
        MUON => 0.105_658_4,
        TAU => 1.776_82,
        Z0 => 91.1876,
        HIGGS => 125.,
        PROTON => 0.938_272,
        _ => 0.,
    }
}

/// Whether a species is its own antiparticle
pub fn is_self_conjugate(id: Species) -> bool {
    matches!(id.abs(), GLUON | PHOTON | Z0 | HIGGS)
}

/// Human-readable name of a species, for event listings
pub fn name(id: Species) -> String {
    let (base, conjugate) = match id.abs() {
        DOWN => ("d", "dbar"),
        UP => ("u", "ubar"),
        STRANGE => ("s", "sbar"),
        CHARM => ("c", "cbar"),
        BOTTOM => ("b", "bbar"),
        ELECTRON => ("e-", "e+"),
        NU_E => ("nu_e", "nu_ebar"),
        MUON => ("mu-", "mu+"),
        NU_MU => ("nu_mu", "nu_mubar"),
        TAU => ("tau-", "tau+"),
        NU_TAU => ("nu_tau", "nu_taubar"),
        GLUON => ("g", "g"),
        PHOTON => ("gamma", "gamma"),
        Z0 => ("Z0", "Z0"),
        HIGGS => ("h0", "h0"),
        PROTON => ("p+", "pbar-"),
        _ => return format!("({})", id),
    };
    let name = if id > 0 || is_self_conjugate(id) { base } else { conjugate };
    name.to_owned()
}
