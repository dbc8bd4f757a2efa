//! Resonances which the parton-level generator can produce, with their decay
//! tables and mass windows

use crate::{
    evgen::settings::{DecayMode, MassBound, Setting},
    numeric::{floats::consts::PI, Float},
    random::RandomGenerator,
    species::{self, *},
    Result,
};

use eyre::{bail, ensure};

/// One decay channel of a resonance
#[derive(Clone, Debug, PartialEq)]
pub struct DecayChannel {
    /// Decay products
    pub products: [Species; 2],

    /// Branching ratio of the channel, before any channel is switched off
    pub branching: Float,

    /// Truth that the channel is open
    pub on: bool,
}
//
impl DecayChannel {
    /// Decay into a fermion-antifermion pair
    fn pair(fermion: Species, branching: Float) -> Self {
        Self {
            products: [fermion, -fermion],
            branching,
            on: true,
        }
    }

    /// Decay into two copies of a self-conjugate boson
    fn bosons(boson: Species, branching: Float) -> Self {
        Self {
            products: [boson, boson],
            branching,
            on: true,
        }
    }

    /// Truth that the decay products match a list of species, irrespective of
    /// order and of charge conjugation
    fn matches(&self, ids: &[Species]) -> bool {
        let mut ours = self.products.map(Species::abs);
        let mut theirs = ids.iter().map(|id| id.abs()).collect::<Vec<_>>();
        ours.sort_unstable();
        theirs.sort_unstable();
        ours[..] == theirs[..]
    }

    /// Lowest resonance mass at which this channel is kinematically open
    pub fn threshold(&self) -> Float {
        self.products.iter().copied().map(species::mass).sum()
    }
}

/// A resonance with a Breit-Wigner line shape and a two-body decay table
#[derive(Clone, Debug, PartialEq)]
pub struct Resonance {
    /// Species of the resonance
    pub id: Species,

    /// Pole mass (GeV)
    pub mass: Float,

    /// Total width (GeV)
    pub width: Float,

    /// Lower bound of the generated mass window (GeV)
    pub m_min: Float,

    /// Upper bound of the generated mass window (GeV), infinite if only
    /// bounded by the collision energy
    pub m_max: Float,

    /// Decay table
    pub channels: Vec<DecayChannel>,
}
//
impl Resonance {
    /// Standard Model Higgs boson
    ///
    /// Only the two-body channels are tabulated: decays through off-shell
    /// W/Z pairs are left out, and the table is renormalized over what
    /// remains when channels are picked.
    ///
    pub fn higgs() -> Self {
        Self {
            id: HIGGS,
            mass: species::mass(HIGGS),
            width: 0.004_03,
            m_min: 50.,
            m_max: Float::INFINITY,
            channels: vec![
                DecayChannel::pair(BOTTOM, 0.5824),
                DecayChannel::pair(CHARM, 0.0289),
                DecayChannel::pair(TAU, 0.0627),
                DecayChannel::pair(MUON, 0.000_22),
                DecayChannel::bosons(GLUON, 0.0819),
                DecayChannel::bosons(PHOTON, 0.002_27),
            ],
        }
    }

    /// Z⁰ boson
    pub fn z0() -> Self {
        Self {
            id: Z0,
            mass: species::mass(Z0),
            width: 2.4952,
            m_min: 10.,
            m_max: Float::INFINITY,
            channels: vec![
                DecayChannel::pair(DOWN, 0.1540),
                DecayChannel::pair(UP, 0.1196),
                DecayChannel::pair(STRANGE, 0.1540),
                DecayChannel::pair(CHARM, 0.1196),
                DecayChannel::pair(BOTTOM, 0.1512),
                DecayChannel::pair(ELECTRON, 0.0336),
                DecayChannel::pair(NU_E, 0.0667),
                DecayChannel::pair(MUON, 0.0336),
                DecayChannel::pair(NU_MU, 0.0667),
                DecayChannel::pair(TAU, 0.0336),
                DecayChannel::pair(NU_TAU, 0.0667),
            ],
        }
    }

    /// Apply a decay table or mass window setting targeting this resonance
    ///
    /// Returns false if the setting targets another particle.
    ///
    pub fn apply(&mut self, setting: &Setting) -> Result<bool> {
        match setting {
            Setting::Decay(id, mode) if *id == self.id => {
                match mode {
                    DecayMode::All(on) => self.channels.iter_mut().for_each(|c| c.on = *on),
                    DecayMode::OnIfMatch(ids) => self.switch_matching(ids, true)?,
                    DecayMode::OffIfMatch(ids) => self.switch_matching(ids, false)?,
                }
                Ok(true)
            }
            Setting::MassRange(id, bound, value) if *id == self.id => {
                match bound {
                    MassBound::Min => self.m_min = *value,
                    // Like generators usually do, a zero upper bound means "no bound"
                    MassBound::Max if *value <= 0. => self.m_max = Float::INFINITY,
                    MassBound::Max => self.m_max = *value,
                }
                Ok(true)
            }
            Setting::Decay(..) | Setting::MassRange(..) => Ok(false),
            _ => bail!("{:?} does not apply to a resonance", setting),
        }
    }

    /// Switch on or off the channels whose products match a species list
    fn switch_matching(&mut self, ids: &[Species], on: bool) -> Result<()> {
        let mut matched = false;
        for channel in self.channels.iter_mut().filter(|c| c.matches(ids)) {
            channel.on = on;
            matched = true;
        }
        ensure!(
            matched,
            "Particle {} has no decay channel into {:?}",
            self.id,
            ids
        );
        Ok(())
    }

    /// Open channels which fit below a given maximal mass
    fn open_channels(&self, max_mass: Float) -> impl Iterator<Item = &DecayChannel> {
        self.channels
            .iter()
            .filter(move |c| c.on && c.threshold() < max_mass)
    }

    /// Check that events can be generated at a given collision energy
    pub fn check(&self, e_cm: Float) -> Result<()> {
        let m_max = self.m_max.min(e_cm);
        ensure!(
            self.m_min < m_max,
            "Empty mass window [{}, {}] for particle {}",
            self.m_min,
            m_max,
            self.id
        );
        ensure!(
            self.m_min <= self.mass && self.mass <= m_max,
            "Mass window [{}, {}] of particle {} excludes its pole mass {}",
            self.m_min,
            m_max,
            self.id,
            self.mass
        );
        ensure!(
            self.open_channels(m_max).next().is_some(),
            "Particle {} has no open decay channel",
            self.id
        );
        Ok(())
    }

    /// Pick a decay channel according to the branching ratios of the open
    /// channels which fit below the collision energy
    pub fn pick_channel(&self, e_cm: Float, rng: &mut RandomGenerator) -> &DecayChannel {
        let m_max = self.m_max.min(e_cm);
        let total: Float = self.open_channels(m_max).map(|c| c.branching).sum();
        let mut target = total * rng.random();
        let mut last = None;
        for channel in self.open_channels(m_max) {
            if target < channel.branching {
                return channel;
            }
            target -= channel.branching;
            last = Some(channel);
        }
        // Round-off may leave us past the last channel
        last.expect("check() should have been called before event generation")
    }

    /// Sample a mass from a Breit-Wigner, truncated to the mass window and to
    /// the kinematic range of a decay channel
    pub fn sample_mass(
        &self,
        channel: &DecayChannel,
        e_cm: Float,
        rng: &mut RandomGenerator,
    ) -> Float {
        let low = self.m_min.max(channel.threshold());
        let high = self.m_max.min(e_cm);
        loop {
            let m = self.mass + self.width / 2. * (PI * (rng.random() - 0.5)).tan();
            if low < m && m < high {
                return m;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_products(res: &Resonance) -> Vec<[Species; 2]> {
        res.channels.iter().filter(|c| c.on).map(|c| c.products).collect()
    }

    #[test]
    fn restrict_higgs_to_bbar() {
        let mut higgs = Resonance::higgs();
        assert!(higgs.apply(&Setting::Decay(HIGGS, DecayMode::All(false))).unwrap());
        assert!(higgs
            .apply(&Setting::Decay(HIGGS, DecayMode::OnIfMatch(vec![5, -5])))
            .unwrap());
        assert_eq!(open_products(&higgs), vec![[BOTTOM, -BOTTOM]]);
    }

    #[test]
    fn on_if_match_leaves_other_channels_alone() {
        let mut z = Resonance::z0();
        z.apply(&Setting::Decay(Z0, DecayMode::OffIfMatch(vec![11, -11])))
            .unwrap();
        assert_eq!(open_products(&z).len(), z.channels.len() - 1);
        z.apply(&Setting::Decay(Z0, DecayMode::OnIfMatch(vec![-11, 11])))
            .unwrap();
        assert_eq!(open_products(&z).len(), z.channels.len());
    }

    #[test]
    fn unmatched_channel_is_an_error() {
        let mut z = Resonance::z0();
        assert!(z
            .apply(&Setting::Decay(Z0, DecayMode::OnIfMatch(vec![5, -6])))
            .is_err());
    }

    #[test]
    fn settings_for_other_particles_are_ignored() {
        let mut z = Resonance::z0();
        assert!(!z.apply(&Setting::Decay(HIGGS, DecayMode::All(false))).unwrap());
        assert_eq!(z, Resonance::z0());
    }

    #[test]
    fn no_open_channel_fails_check() {
        let mut higgs = Resonance::higgs();
        higgs.apply(&Setting::Decay(HIGGS, DecayMode::All(false))).unwrap();
        assert!(higgs.check(13_000.).is_err());
        assert!(Resonance::higgs().check(13_000.).is_ok());
        assert!(Resonance::higgs().check(100.).is_err());
    }

    #[test]
    fn masses_stay_in_window() {
        let mut z = Resonance::z0();
        z.apply(&Setting::MassRange(Z0, MassBound::Min, 80.)).unwrap();
        z.apply(&Setting::MassRange(Z0, MassBound::Max, 100.)).unwrap();
        z.check(13_000.).unwrap();
        let mut rng = RandomGenerator::new(1);
        for _ in 0..1000 {
            let channel = z.pick_channel(13_000., &mut rng).clone();
            let m = z.sample_mass(&channel, 13_000., &mut rng);
            assert!(80. < m && m < 100.);
        }
    }

    #[test]
    fn closed_channels_are_never_picked() {
        let mut z = Resonance::z0();
        z.apply(&Setting::Decay(Z0, DecayMode::All(false))).unwrap();
        z.apply(&Setting::Decay(Z0, DecayMode::OnIfMatch(vec![11, -11])))
            .unwrap();
        let mut rng = RandomGenerator::new(2);
        for _ in 0..100 {
            assert_eq!(z.pick_channel(13_000., &mut rng).products, [ELECTRON, -ELECTRON]);
        }
    }
}
