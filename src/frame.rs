// Copyright (c) 2026 rezky_nightky

use std::io::Result;

use glam::IVec3;

use crate::color::Color;
use crate::display::VoxelDisplay;

/// Volumetric framebuffer, x fastest, then y, then depth.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelFrame {
    max_bound: IVec3,
    voxels: Vec<Color>,
    tick_rate: u32,
    presents: u64,
}

impl VoxelFrame {
    pub fn new(max_bound: IVec3, tick_rate: u32) -> Self {
        let dims = (max_bound + IVec3::ONE).max(IVec3::ZERO);
        let len = dims.x as usize * dims.y as usize * dims.z as usize;
        Self {
            max_bound,
            voxels: vec![Color::BLACK; len],
            tick_rate,
            presents: 0,
        }
    }

    /// Voxels per axis.
    pub fn dims(&self) -> IVec3 {
        self.max_bound + IVec3::ONE
    }

    pub fn index(&self, at: IVec3) -> Option<usize> {
        if at.cmplt(IVec3::ZERO).any() || at.cmpgt(self.max_bound).any() {
            return None;
        }
        let d = self.dims();
        Some((at.z as usize * d.y as usize + at.y as usize) * d.x as usize + at.x as usize)
    }

    pub fn get(&self, at: IVec3) -> Option<Color> {
        self.index(at).map(|i| self.voxels[i])
    }

    pub fn clear(&mut self) {
        self.voxels.fill(Color::BLACK);
    }

    pub fn lit_count(&self) -> usize {
        self.voxels.iter().filter(|c| !c.is_black()).count()
    }

    /// How many times the buffer has been presented.
    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl VoxelDisplay for VoxelFrame {
    fn set_pixel(&mut self, at: IVec3, color: Color) {
        if let Some(i) = self.index(at) {
            self.voxels[i] = color;
        }
    }

    fn fade(&mut self, factor: f32) {
        if factor >= 1.0 {
            return;
        }
        for v in &mut self.voxels {
            if !v.is_black() {
                *v *= factor;
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn tick_rate(&self) -> u32 {
        self.tick_rate
    }
}
