// Copyright (c) 2026 rezky_nightky

use std::io::Result;

use glam::IVec3;

use crate::color::Color;

/// What the rain needs from a voxel display.
pub trait VoxelDisplay {
    /// Overwrites one voxel. Callers only pass in-range coordinates.
    fn set_pixel(&mut self, at: IVec3, color: Color);

    /// Scales every voxel by `factor` (in `[0, 1]`), darkening it toward black.
    fn fade(&mut self, factor: f32);

    /// Presents the current buffer.
    fn render(&mut self) -> Result<()>;

    /// Ticks per second the host drives the simulation at.
    fn tick_rate(&self) -> u32;
}
