// Copyright (c) 2026 rezky_nightky

use glam::{IVec3, Vec3};

use crate::color::Color;

/// Point mass advanced with explicit Euler steps of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub color: Color,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, acceleration: Vec3, color: Color) -> Self {
        Self {
            position,
            velocity,
            acceleration,
            color,
        }
    }

    pub fn step(&mut self) {
        self.accelerate();
        self.advance();
    }

    pub fn accelerate(&mut self) {
        self.velocity += self.acceleration;
    }

    pub fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Nearest voxel, rounding each axis independently (halves away from zero).
    pub fn voxel(&self) -> IVec3 {
        self.position.round().as_ivec3()
    }
}
