// Copyright (c) 2026 rezky_nightky

use std::io::Result;

use glam::{IVec3, Vec2};
use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};
use tracing::{debug, trace, warn};

use crate::color::Color;
use crate::display::VoxelDisplay;
use crate::droplet::Droplet;
use crate::input::{
    Gamepad, InputDevice, BUTTON_COLOR, BUTTON_FADE_DOWN, BUTTON_FADE_UP, BUTTON_PAUSE,
};
use crate::palette::{ColorCycler, DEFAULT_PHASE_COUNT};

pub const MAX_DEVICES: usize = 4;
pub const FADE_MIN: f32 = 0.05;
pub const FADE_MAX: f32 = 1.0;
pub const FADE_STEP: f32 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Largest voxel index on each axis.
    pub max_bound: IVec3,
    pub spawn_per_tick: usize,
    /// Horizontal speed of new drops, in voxels per tick.
    pub drop_speed: f32,
    pub fade_factor: f32,
    pub color_phases: u8,
    /// Drops advance on every n-th tick only.
    pub step_every: u32,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_bound: IVec3::splat(23),
            spawn_per_tick: 4,
            drop_speed: 0.5,
            fade_factor: 0.9,
            color_phases: DEFAULT_PHASE_COUNT,
            step_every: 1,
            seed: None,
        }
    }
}

/// Owns the live drops and runs one rain tick per call.
pub struct ParticleEngine<D: InputDevice = Gamepad> {
    config: EngineConfig,
    drops: Vec<Droplet>,
    devices: Vec<D>,
    cycler: ColorCycler,
    fade_factor: f32,
    paused: bool,
    ticks: u64,
    mt: StdRng,
    rand_angle: Uniform<f32>,
}

impl<D: InputDevice> ParticleEngine<D> {
    pub fn new(config: EngineConfig) -> Self {
        let mut mt = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let cycler = ColorCycler::new(config.color_phases, &mut mt);
        Self {
            fade_factor: config.fade_factor.clamp(FADE_MIN, FADE_MAX),
            config,
            drops: Vec::new(),
            devices: Vec::with_capacity(MAX_DEVICES),
            cycler,
            paused: false,
            ticks: 0,
            mt,
            rand_angle: Uniform::new(0.0, 360.0).expect("valid range"),
        }
    }

    pub fn with_devices(config: EngineConfig, devices: impl IntoIterator<Item = D>) -> Self {
        let mut engine = Self::new(config);
        for d in devices {
            engine.attach_device(d);
        }
        engine
    }

    /// Adds an input device. Returns false (and drops the device) once four are attached.
    pub fn attach_device(&mut self, device: D) -> bool {
        if self.devices.len() >= MAX_DEVICES {
            warn!("ignoring input device: {} already attached", MAX_DEVICES);
            return false;
        }
        self.devices.push(device);
        true
    }

    pub fn devices_mut(&mut self) -> &mut [D] {
        &mut self.devices
    }

    /// Hands the devices back to the caller; the engine keeps running without input.
    pub fn detach_devices(&mut self) -> Vec<D> {
        std::mem::take(&mut self.devices)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn drops(&self) -> &[Droplet] {
        &self.drops
    }

    pub fn fade_factor(&self) -> f32 {
        self.fade_factor
    }

    pub fn set_fade_factor(&mut self, f: f32) {
        self.fade_factor = f.clamp(FADE_MIN, FADE_MAX);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        debug!(paused = self.paused, "pause toggled");
    }

    pub fn color_phase(&self) -> usize {
        self.cycler.phase()
    }

    pub fn spawn_color(&self) -> Color {
        self.cycler.current()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drops every live drop. The framebuffer is left to the host.
    pub fn reset(&mut self) {
        debug!(dropped = self.drops.len(), "rain reset");
        self.drops.clear();
    }

    pub fn tick<V: VoxelDisplay + ?Sized>(&mut self, display: &mut V) -> Result<()> {
        self.read_input();
        if self.paused {
            return Ok(());
        }

        display.fade(self.fade_factor);

        self.spawn_drops();
        self.cycler.advance(&mut self.mt);

        let step_every = self.config.step_every.clamp(1, display.tick_rate().max(1)) as u64;
        let stepping = self.ticks % step_every == 0;

        for d in &mut self.drops {
            if stepping {
                d.step(&mut self.mt);
            }
            display.set_pixel(d.voxel(), d.color());
        }

        let live = self.drops.len();
        self.drops.retain(|d| !d.is_settled());
        trace!(
            tick = self.ticks,
            live = self.drops.len(),
            settled = live - self.drops.len(),
            "rain tick"
        );

        self.ticks = self.ticks.wrapping_add(1);
        display.render()
    }

    fn read_input(&mut self) {
        let mut presses = 0u32;
        let mut toggles = 0u32;
        let before = self.fade_factor;
        let mut fade = before;

        for dev in &mut self.devices {
            if dev.button_pressed(BUTTON_COLOR) {
                presses += 1;
            }
            if dev.button_pressed(BUTTON_PAUSE) {
                toggles += 1;
            }
            // Each press is one clamped step, applied device by device.
            if dev.button_pressed(BUTTON_FADE_DOWN) {
                fade = (fade - FADE_STEP).clamp(FADE_MIN, FADE_MAX);
            }
            if dev.button_pressed(BUTTON_FADE_UP) {
                fade = (fade + FADE_STEP).clamp(FADE_MIN, FADE_MAX);
            }
            dev.clear_button_edges();
        }

        for _ in 0..presses {
            self.cycler.press();
        }
        if presses > 0 {
            debug!(
                phase = self.cycler.phase(),
                presses = self.cycler.presses(),
                "color phase changed"
            );
        }

        for _ in 0..toggles {
            self.toggle_pause();
        }

        if fade != before {
            self.set_fade_factor(fade);
            debug!(fade = self.fade_factor, "fade factor changed");
        }
    }

    fn spawn_drops(&mut self) {
        let color = self.cycler.current();
        for _ in 0..self.config.spawn_per_tick {
            let a = self.rand_angle.sample(&mut self.mt).to_radians();
            let v = Vec2::new(a.cos(), a.sin()) * self.config.drop_speed;
            self.drops.push(Droplet::spawn(self.config.max_bound, v, color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::VoxelFrame;

    fn config() -> EngineConfig {
        EngineConfig {
            max_bound: IVec3::splat(7),
            seed: Some(42),
            ..EngineConfig::default()
        }
    }

    fn make_engine() -> (ParticleEngine, VoxelFrame) {
        let engine = ParticleEngine::with_devices(config(), [Gamepad::new()]);
        let frame = VoxelFrame::new(IVec3::splat(7), 40);
        (engine, frame)
    }

    fn press(engine: &mut ParticleEngine, button: u8) {
        engine.devices_mut()[0].press(button);
    }

    #[test]
    fn tick_spawns_steps_draws_and_presents() {
        let (mut engine, mut frame) = make_engine();
        let color = engine.spawn_color();
        engine.tick(&mut frame).unwrap();

        assert_eq!(engine.drops().len(), 4);
        assert_eq!(frame.presents(), 1);
        assert_eq!(engine.ticks(), 1);
        for d in engine.drops() {
            assert_eq!(d.color(), color);
            assert_eq!(d.position().z, 0.0);
            assert_eq!(frame.get(d.voxel()), Some(color));
            let speed = d.velocity().truncate().length();
            assert!((speed - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn drops_are_removed_once_settled_and_population_stays_bounded() {
        let (mut engine, mut frame) = make_engine();
        let mut max_live = 0;
        for _ in 0..500 {
            engine.tick(&mut frame).unwrap();
            assert!(engine.drops().iter().all(|d| !d.is_settled()));
            max_live = max_live.max(engine.drops().len());
        }
        // Every drop settles well within 100 ticks in a cube this small.
        assert!(max_live <= 4 * 100, "{} live drops", max_live);
        assert_eq!(frame.presents(), 500);
    }

    #[test]
    fn single_batch_settles_and_leaves() {
        let (mut engine, mut frame) = make_engine();
        engine.tick(&mut frame).unwrap();
        engine.config.spawn_per_tick = 0;
        for _ in 0..500 {
            if engine.drops().is_empty() {
                break;
            }
            engine.tick(&mut frame).unwrap();
        }
        assert!(engine.drops().is_empty());
    }

    #[test]
    fn paused_ticks_freeze_everything() {
        let (mut engine, mut frame) = make_engine();
        for _ in 0..5 {
            engine.tick(&mut frame).unwrap();
        }

        press(&mut engine, BUTTON_PAUSE);
        engine.tick(&mut frame).unwrap();
        assert!(engine.is_paused());

        let drops = engine.drops().to_vec();
        let snapshot = frame.clone();
        let ticks = engine.ticks();
        engine.tick(&mut frame).unwrap();
        engine.tick(&mut frame).unwrap();
        assert_eq!(engine.drops(), drops.as_slice());
        assert_eq!(frame, snapshot);
        assert_eq!(engine.ticks(), ticks);

        press(&mut engine, BUTTON_PAUSE);
        engine.tick(&mut frame).unwrap();
        assert!(!engine.is_paused());
        assert_eq!(frame.presents(), snapshot.presents() + 1);
    }

    #[test]
    fn fade_factor_is_clamped() {
        let (mut engine, mut frame) = make_engine();
        for _ in 0..10 {
            press(&mut engine, BUTTON_FADE_UP);
            engine.tick(&mut frame).unwrap();
            assert!(engine.fade_factor() <= FADE_MAX);
        }
        assert_eq!(engine.fade_factor(), FADE_MAX);

        for _ in 0..10 {
            press(&mut engine, BUTTON_FADE_DOWN);
            engine.tick(&mut frame).unwrap();
            assert!(engine.fade_factor() >= FADE_MIN);
        }
        assert_eq!(engine.fade_factor(), FADE_MIN);
    }

    #[test]
    fn fade_presses_from_each_device_step_one_at_a_time() {
        let cfg = EngineConfig {
            fade_factor: 1.0,
            ..config()
        };
        let mut engine = ParticleEngine::with_devices(cfg, [Gamepad::new(), Gamepad::new()]);
        let mut frame = VoxelFrame::new(IVec3::splat(7), 40);

        engine.devices_mut()[0].press(BUTTON_FADE_UP);
        engine.devices_mut()[1].press(BUTTON_FADE_DOWN);
        engine.tick(&mut frame).unwrap();
        // Up is lost against the ceiling, then down takes one full step.
        assert!((engine.fade_factor() - (FADE_MAX - FADE_STEP)).abs() < 1e-6);

        engine.set_fade_factor(FADE_MIN);
        engine.devices_mut()[0].press(BUTTON_FADE_DOWN);
        engine.devices_mut()[1].press(BUTTON_FADE_UP);
        engine.tick(&mut frame).unwrap();
        assert!((engine.fade_factor() - (FADE_MIN + FADE_STEP)).abs() < 1e-6);
    }

    #[test]
    fn color_button_moves_phase_and_edges_are_cleared() {
        let (mut engine, mut frame) = make_engine();
        assert_eq!(engine.color_phase(), 0);
        press(&mut engine, BUTTON_COLOR);
        engine.tick(&mut frame).unwrap();
        assert_eq!(engine.color_phase(), 1);
        assert!(!engine.devices_mut()[0].button_pressed(BUTTON_COLOR));

        // After the next batch the spawn color follows phase 1: no green.
        engine.tick(&mut frame).unwrap();
        assert_eq!(engine.spawn_color().g, 0);

        engine.tick(&mut frame).unwrap();
        assert_eq!(engine.color_phase(), 1);
    }

    #[test]
    fn every_device_contributes_edges() {
        let mut engine: ParticleEngine =
            ParticleEngine::with_devices(config(), [Gamepad::new(), Gamepad::new()]);
        let mut frame = VoxelFrame::new(IVec3::splat(7), 40);
        engine.devices_mut()[0].press(BUTTON_COLOR);
        engine.devices_mut()[1].press(BUTTON_COLOR);
        engine.tick(&mut frame).unwrap();
        // Two presses in one tick wrap back to phase 0 with two phases.
        assert_eq!(engine.color_phase(), 0);
    }

    #[test]
    fn no_devices_is_fine() {
        let mut engine: ParticleEngine = ParticleEngine::new(config());
        let mut frame = VoxelFrame::new(IVec3::splat(7), 40);
        engine.tick(&mut frame).unwrap();
        assert_eq!(engine.drops().len(), 4);
    }

    #[test]
    fn at_most_four_devices() {
        let mut engine: ParticleEngine =
            ParticleEngine::with_devices(config(), std::iter::repeat(Gamepad::new()).take(4));
        assert!(!engine.attach_device(Gamepad::new()));
        assert_eq!(engine.devices_mut().len(), MAX_DEVICES);
        assert_eq!(engine.detach_devices().len(), MAX_DEVICES);
        assert!(engine.devices_mut().is_empty());
    }

    #[test]
    fn step_every_holds_drops_between_steps() {
        let mut cfg = config();
        cfg.step_every = 3;
        cfg.spawn_per_tick = 1;
        let mut engine: ParticleEngine = ParticleEngine::new(cfg);
        let mut frame = VoxelFrame::new(IVec3::splat(7), 40);

        engine.tick(&mut frame).unwrap();
        let after_first = engine.drops()[0].position();
        engine.tick(&mut frame).unwrap();
        engine.tick(&mut frame).unwrap();
        assert_eq!(engine.drops()[0].position(), after_first);
        engine.tick(&mut frame).unwrap();
        assert_ne!(engine.drops()[0].position(), after_first);
    }

    #[test]
    fn step_every_is_capped_by_tick_rate() {
        let mut cfg = config();
        cfg.step_every = 1000;
        cfg.spawn_per_tick = 1;
        let mut engine: ParticleEngine = ParticleEngine::new(cfg);
        let mut frame = VoxelFrame::new(IVec3::splat(7), 2);

        engine.tick(&mut frame).unwrap();
        let after_first = engine.drops()[0].position();
        engine.tick(&mut frame).unwrap();
        engine.tick(&mut frame).unwrap();
        assert_ne!(engine.drops()[0].position(), after_first);
    }

    #[test]
    fn reset_clears_live_drops() {
        let (mut engine, mut frame) = make_engine();
        engine.tick(&mut frame).unwrap();
        engine.reset();
        assert!(engine.drops().is_empty());
    }
}
