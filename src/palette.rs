// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::color::Color;

use self::ChannelRule::{Band, Fixed, Zero};

/// How one channel of the spawn color is produced in a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelRule {
    Zero,
    Fixed(u8),
    /// `255 - k` with `k` uniform in `0..n`.
    Band(u8),
}

impl ChannelRule {
    fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        match self {
            ChannelRule::Zero => 0,
            ChannelRule::Fixed(v) => v,
            ChannelRule::Band(n) => 255 - rng.random_range(0..n.max(1)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseRule {
    pub name: &'static str,
    pub r: ChannelRule,
    pub g: ChannelRule,
    pub b: ChannelRule,
    /// Dim the whole color by a random factor in `[0, 1)`.
    pub scaled: bool,
}

pub const PHASES: [PhaseRule; 6] = [
    PhaseRule {
        name: "sea",
        r: Zero,
        g: Fixed(255),
        b: Fixed(150),
        scaled: true,
    },
    PhaseRule {
        name: "violet",
        r: Band(200),
        g: Zero,
        b: Band(100),
        scaled: false,
    },
    PhaseRule {
        name: "amber",
        r: Band(100),
        g: Band(200),
        b: Zero,
        scaled: false,
    },
    PhaseRule {
        name: "blue",
        r: Zero,
        g: Zero,
        b: Band(200),
        scaled: false,
    },
    PhaseRule {
        name: "red",
        r: Band(200),
        g: Zero,
        b: Zero,
        scaled: false,
    },
    PhaseRule {
        name: "green",
        r: Zero,
        g: Band(200),
        b: Zero,
        scaled: false,
    },
];

/// Number of phases the cycler selects from unless told otherwise. Only the first two
/// rules of [`PHASES`] are reachable with it.
pub const DEFAULT_PHASE_COUNT: u8 = 2;

impl PhaseRule {
    pub fn apply<R: Rng + ?Sized>(&self, color: &mut Color, rng: &mut R) {
        color.set_r(self.r.sample(rng));
        color.set_g(self.g.sample(rng));
        color.set_b(self.b.sample(rng));
        if self.scaled {
            *color *= rng.random_range(0..100u8) as f32 / 100.0;
        }
    }
}

/// Produces the color of newly spawned drops. The phase counter moves on button presses;
/// the color itself is re-rolled from the active phase after every spawn batch.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorCycler {
    presses: u32,
    phase_count: u8,
    current: Color,
}

impl ColorCycler {
    pub fn new<R: Rng + ?Sized>(phase_count: u8, rng: &mut R) -> Self {
        let g = 255 - rng.random_range(0..100u8);
        let b = 255 - rng.random_range(0..200u8);
        Self {
            presses: 0,
            phase_count: phase_count.clamp(1, PHASES.len() as u8),
            current: Color::new(0, g, b),
        }
    }

    #[allow(dead_code)]
    pub fn phase_count(&self) -> u8 {
        self.phase_count
    }

    pub fn presses(&self) -> u32 {
        self.presses
    }

    pub fn phase(&self) -> usize {
        (self.presses % self.phase_count as u32) as usize
    }

    pub fn rule(&self) -> &'static PhaseRule {
        &PHASES[self.phase()]
    }

    pub fn current(&self) -> Color {
        self.current
    }

    pub fn press(&mut self) {
        self.presses = self.presses.wrapping_add(1);
    }

    /// Re-rolls the current color from the active phase.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let rule = self.rule();
        rule.apply(&mut self.current, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn initial_color_is_teal_band() {
        let mut rng = rng();
        for _ in 0..50 {
            let c = ColorCycler::new(2, &mut rng).current();
            assert_eq!(c.r, 0);
            assert!(c.g >= 156);
            assert!(c.b >= 56);
        }
    }

    #[test]
    fn default_phase_count_only_reaches_two_phases() {
        let mut rng = rng();
        let mut cycler = ColorCycler::new(DEFAULT_PHASE_COUNT, &mut rng);
        let mut seen = Vec::new();
        for _ in 0..12 {
            seen.push(cycler.phase());
            cycler.press();
        }
        assert_eq!(seen, vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn full_phase_count_visits_every_rule() {
        let mut rng = rng();
        let mut cycler = ColorCycler::new(6, &mut rng);
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(cycler.rule().name);
            cycler.press();
        }
        assert_eq!(seen, vec!["sea", "violet", "amber", "blue", "red", "green"]);
        assert_eq!(cycler.phase(), 0);
    }

    #[test]
    fn phase_count_is_clamped() {
        let mut rng = rng();
        assert_eq!(ColorCycler::new(0, &mut rng).phase_count(), 1);
        assert_eq!(ColorCycler::new(9, &mut rng).phase_count(), 6);
    }

    #[test]
    fn phase_rules_zero_and_band_channels() {
        let mut rng = rng();
        let mut cycler = ColorCycler::new(6, &mut rng);
        for _ in 0..100 {
            cycler.advance(&mut rng);
            let c = cycler.current();
            assert_eq!(c.r, 0);
            assert!(c.g >= c.b);
        }

        cycler.press();
        for _ in 0..100 {
            cycler.advance(&mut rng);
            let c = cycler.current();
            assert_eq!(c.g, 0);
            assert!(c.r >= 56);
            assert!(c.b >= 156);
        }

        cycler.press();
        cycler.press();
        cycler.press();
        for _ in 0..100 {
            cycler.advance(&mut rng);
            let c = cycler.current();
            assert_eq!((c.g, c.b), (0, 0));
            assert!(c.r >= 56);
        }
    }

    #[test]
    fn sea_phase_scales_both_channels_together() {
        let mut rng = rng();
        let mut c = Color::new(9, 9, 9);
        for _ in 0..100 {
            PHASES[0].apply(&mut c, &mut rng);
            assert_eq!(c.r, 0);
            assert!(c.g <= 252);
            assert!(c.b <= 148);
            assert!(c.b <= c.g);
        }
    }
}
