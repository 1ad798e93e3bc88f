// Copyright (c) 2026 rezky_nightky

use glam::{IVec3, Vec2, Vec3};
use rand::Rng;

use crate::color::Color;
use crate::particle::Particle;

/// Vertical rate a drop picks up once it runs off the horizontal span.
const SLIDE_FALL_SPEED: f32 = 0.2;
const SLIDE_BASE_ACCEL: f32 = 0.001;
/// The slide acceleration adds `k / SLIDE_ACCEL_DIVISOR` for `k` in `0..SLIDE_ACCEL_STEPS`.
const SLIDE_ACCEL_STEPS: u32 = 10;
const SLIDE_ACCEL_DIVISOR: f32 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPhase {
    /// Moving across the top face with its spawn velocity.
    Falling,
    /// Ran off the horizontal span; running down the side wall.
    Sliding,
    /// Reached the far face and glides back toward the center.
    Rebounding,
    /// At rest on the far face. Terminal.
    Settled,
}

pub fn horizontal_center(max_bound: IVec3) -> Vec2 {
    max_bound.truncate().as_vec2() * 0.5
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Droplet {
    pub particle: Particle,
    max_bound: IVec3,
    center: Vec2,
    cached_velocity: Vec2,
    phase: DropPhase,
}

impl Droplet {
    pub fn new(
        max_bound: IVec3,
        position: Vec3,
        velocity: Vec3,
        acceleration: Vec3,
        color: Color,
    ) -> Self {
        Self {
            particle: Particle::new(position, velocity, acceleration, color),
            max_bound,
            center: horizontal_center(max_bound),
            cached_velocity: Vec2::ZERO,
            phase: DropPhase::Falling,
        }
    }

    /// A drop at the top-center of the volume moving horizontally.
    pub fn spawn(max_bound: IVec3, horizontal_velocity: Vec2, color: Color) -> Self {
        let c = horizontal_center(max_bound);
        Self::new(
            max_bound,
            c.extend(0.0),
            horizontal_velocity.extend(0.0),
            Vec3::ZERO,
            color,
        )
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> DropPhase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        self.phase == DropPhase::Settled
    }

    #[allow(dead_code)]
    pub fn max_bound(&self) -> IVec3 {
        self.max_bound
    }

    /// Horizontal velocity captured when the drop first left the horizontal span.
    #[allow(dead_code)]
    pub fn cached_velocity(&self) -> Vec2 {
        self.cached_velocity
    }

    #[allow(dead_code)]
    pub fn position(&self) -> Vec3 {
        self.particle.position
    }

    #[allow(dead_code)]
    pub fn velocity(&self) -> Vec3 {
        self.particle.velocity
    }

    pub fn color(&self) -> Color {
        self.particle.color
    }

    pub fn voxel(&self) -> IVec3 {
        self.particle.voxel()
    }

    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_settled() {
            return;
        }

        self.particle.step();

        if self.outside_horizontal_span() {
            self.start_slide(rng);
        }
        self.clamp_side_walls();
        self.handle_depth();

        if self.at_far_face() {
            self.stop_past_center();
            let v = self.particle.velocity;
            if v.x == 0.0 && v.y == 0.0 {
                self.phase = DropPhase::Settled;
            }
        }
    }

    fn outside_horizontal_span(&self) -> bool {
        let p = self.particle.position;
        let max = self.max_bound.as_vec3();
        p.x < 0.0 || p.y < 0.0 || p.x > max.x || p.y > max.y
    }

    fn at_far_face(&self) -> bool {
        self.particle.position.z == self.max_bound.z as f32
    }

    fn start_slide<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let k = rng.random_range(0..SLIDE_ACCEL_STEPS) as f32;
        let p = &mut self.particle;
        p.velocity.z = SLIDE_FALL_SPEED;
        p.acceleration = Vec3::new(0.0, 0.0, SLIDE_BASE_ACCEL + k / SLIDE_ACCEL_DIVISOR);

        // Only the first escape records the direction to rebound along.
        if self.phase == DropPhase::Falling {
            self.cached_velocity = p.velocity.truncate();
            self.phase = DropPhase::Sliding;
        }
        p.velocity.x = 0.0;
        p.velocity.y = 0.0;
    }

    /// Clamps x and y to the volume. A side wall hit also puts the drop back on the
    /// front face (depth 0), so it runs down the wall from the top.
    fn clamp_side_walls(&mut self) {
        let max = self.max_bound.as_vec3();
        let p = &mut self.particle.position;
        let mut hit_wall = false;
        for axis in 0..2 {
            if p[axis] < 0.0 {
                p[axis] = 0.0;
                hit_wall = true;
            } else if p[axis] > max[axis] {
                p[axis] = max[axis];
                hit_wall = true;
            }
        }
        if hit_wall {
            p.z = 0.0;
        }
    }

    fn handle_depth(&mut self) {
        let max_z = self.max_bound.z as f32;
        let p = &mut self.particle;

        if p.position.z < 0.0 {
            p.position.z = 0.0;
            p.velocity.z = -p.velocity.z;
        }

        if p.position.z > max_z {
            p.position.z = max_z;
            p.velocity = (-self.cached_velocity).extend(0.0);
            p.acceleration = Vec3::ZERO;
            self.phase = DropPhase::Rebounding;
        }
    }

    /// Stops each horizontal axis once the drop has come back past the center line.
    fn stop_past_center(&mut self) {
        let p = &mut self.particle;
        for axis in 0..2 {
            let v = p.velocity[axis];
            let pos = p.position[axis];
            let c = self.center[axis];
            // Inclusive: a drop spawned on the center line never moves off it, and a strict
            // test would leave its residual f32 velocity set so it never settles.
            if (v > 0.0 && pos >= c) || (v < 0.0 && pos <= c) {
                p.velocity[axis] = 0.0;
                self.cached_velocity[axis] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    const CUBE7: IVec3 = IVec3::new(7, 7, 7);

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn in_bounds(d: &Droplet) -> bool {
        let p = d.position();
        let m = d.max_bound().as_vec3();
        (0.0..=m.x).contains(&p.x) && (0.0..=m.y).contains(&p.y) && (0.0..=m.z).contains(&p.z)
    }

    fn run_until_settled(d: &mut Droplet, rng: &mut StdRng, max_steps: usize) -> Option<usize> {
        for i in 1..=max_steps {
            d.step(rng);
            assert!(in_bounds(d), "out of bounds at step {}: {:?}", i, d.position());
            if d.is_settled() {
                return Some(i);
            }
        }
        None
    }

    #[test]
    fn spawn_is_top_center() {
        let d = Droplet::spawn(CUBE7, Vec2::new(0.5, 0.0), Color::new(1, 2, 3));
        assert_eq!(d.position(), Vec3::new(3.5, 3.5, 0.0));
        assert_eq!(d.velocity(), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(d.phase(), DropPhase::Falling);
        assert_eq!(d.color(), Color::new(1, 2, 3));
    }

    #[test]
    fn rebounds_with_negated_cached_velocity_and_settles() {
        let mut rng = rng();
        let mut d = Droplet::spawn(CUBE7, Vec2::new(0.5, 0.0), Color::new(0, 255, 150));

        let mut last_falling_velocity = d.velocity().truncate();
        let mut reached_far_face = false;
        for _ in 0..500 {
            let before = d.phase();
            if before == DropPhase::Falling {
                last_falling_velocity = d.velocity().truncate();
            }
            d.step(&mut rng);

            if d.position().z == 7.0 && !reached_far_face {
                reached_far_face = true;
                assert_eq!(before, DropPhase::Sliding);
                assert_eq!(d.phase(), DropPhase::Rebounding);
                assert_eq!(d.velocity().x, -last_falling_velocity.x);
                assert_eq!(d.velocity().y, -last_falling_velocity.y);
                assert_eq!(d.velocity().z, 0.0);
            }
            if d.is_settled() {
                break;
            }
        }

        assert!(reached_far_face);
        assert!(d.is_settled());
        assert_eq!(d.position().z, 7.0);
        assert_eq!(d.velocity().x, 0.0);
        assert_eq!(d.velocity().y, 0.0);
        // Glided back from the wall and stopped just past the center line.
        assert!(d.position().x <= 3.5);
    }

    #[test]
    fn side_wall_hit_resets_depth_and_starts_slide() {
        let mut rng = rng();
        let mut d = Droplet::new(
            CUBE7,
            Vec3::new(6.8, 3.0, 4.0),
            Vec3::new(0.5, 0.25, 0.0),
            Vec3::new(0.125, 0.125, 0.0),
            Color::BLACK,
        );
        d.step(&mut rng);

        assert_eq!(d.phase(), DropPhase::Sliding);
        assert_eq!(d.position().x, 7.0);
        assert_eq!(d.position().z, 0.0);
        assert_eq!(d.velocity().x, 0.0);
        assert_eq!(d.velocity().y, 0.0);
        assert_eq!(d.velocity().z, SLIDE_FALL_SPEED);
        let a = d.particle.acceleration;
        assert_eq!((a.x, a.y), (0.0, 0.0));
        assert!(a.z >= SLIDE_BASE_ACCEL && a.z < SLIDE_BASE_ACCEL + 0.05);
        assert_eq!(d.cached_velocity(), Vec2::new(0.625, 0.375));
    }

    #[test]
    fn second_escape_keeps_first_cached_velocity() {
        let mut rng = rng();
        let mut d = Droplet::new(
            CUBE7,
            Vec3::new(6.9, 3.5, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::ZERO,
            Color::BLACK,
        );
        d.step(&mut rng);
        assert_eq!(d.cached_velocity(), Vec2::new(0.5, 0.0));

        // Push it out through the opposite wall with a different velocity.
        d.particle.position = Vec3::new(0.1, 3.5, 2.0);
        d.particle.velocity = Vec3::new(-1.0, 0.3, 0.2);
        d.step(&mut rng);

        assert_eq!(d.position().x, 0.0);
        assert_eq!(d.position().z, 0.0);
        assert_eq!(d.phase(), DropPhase::Sliding);
        assert_eq!(d.cached_velocity(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn near_face_reflects_vertical_velocity() {
        let mut rng = rng();
        let mut d = Droplet::new(
            CUBE7,
            Vec3::new(3.0, 3.0, 0.1),
            Vec3::new(0.0, 0.0, -0.4),
            Vec3::ZERO,
            Color::BLACK,
        );
        d.step(&mut rng);
        assert_eq!(d.position().z, 0.0);
        assert_eq!(d.velocity().z, 0.4);
    }

    #[test]
    fn reaching_far_face_without_escape_settles_at_once() {
        let mut rng = rng();
        let mut d = Droplet::new(
            CUBE7,
            Vec3::new(2.0, 5.0, 6.5),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 0.1),
            Color::BLACK,
        );
        d.step(&mut rng);
        assert_eq!(d.position().z, 7.0);
        assert_eq!(d.particle.acceleration, Vec3::ZERO);
        assert!(d.is_settled());
    }

    #[test]
    fn settled_drop_stays_settled_and_still() {
        let mut rng = rng();
        let mut d = Droplet::spawn(CUBE7, Vec2::new(0.0, -0.5), Color::BLACK);
        assert!(run_until_settled(&mut d, &mut rng, 500).is_some());

        let snapshot = d;
        for _ in 0..10 {
            d.step(&mut rng);
            assert!(d.is_settled());
        }
        assert_eq!(d, snapshot);
    }

    #[test]
    fn every_whole_degree_direction_settles() {
        let mut rng = rng();
        for size in [7, 23, 63] {
            let bound = IVec3::splat(size);
            for deg in 0..360 {
                let a = (deg as f32).to_radians();
                let v = Vec2::new(a.cos(), a.sin()) * 0.5;
                let mut d = Droplet::spawn(bound, v, Color::BLACK);
                assert!(
                    run_until_settled(&mut d, &mut rng, 1000).is_some(),
                    "{} degrees in a {} cube did not settle",
                    deg,
                    size
                );
                assert_eq!(d.position().z, size as f32);
            }
        }
    }

    proptest! {
        #[test]
        fn stays_in_bounds_and_settles(
            deg in 0.0f32..360.0,
            size in 1i32..48,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let a = deg.to_radians();
            let mut d = Droplet::spawn(
                IVec3::splat(size),
                Vec2::new(a.cos(), a.sin()) * 0.5,
                Color::BLACK,
            );
            let mut settled_at = None;
            for i in 0..500 {
                d.step(&mut rng);
                prop_assert!(in_bounds(&d));
                if d.is_settled() {
                    settled_at = Some(i);
                    break;
                }
            }
            prop_assert!(settled_at.is_some());
        }
    }
}
