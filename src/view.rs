// Copyright (c) 2026 rezky_nightky

use glam::IVec3;

use crate::cell::Cell;
use crate::color::Color;
use crate::frame::VoxelFrame;
use crate::runtime::{ColorMode, ViewMode};
use crate::screen::Screen;

/// Terminal columns per voxel; cells are about twice as tall as wide.
pub const VOXEL_WIDTH: u16 = 2;
const PANEL_GAP: u16 = 2;
const GLYPH: char = '█';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Face {
    Front,
    Side,
    Top,
}

impl Face {
    /// Axis indices: (screen x, screen y, collapsed).
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Face::Front => (0, 2, 1),
            Face::Side => (1, 2, 0),
            Face::Top => (0, 1, 2),
        }
    }
}

fn faces(view: ViewMode) -> &'static [Face] {
    match view {
        ViewMode::Front => &[Face::Front],
        ViewMode::Side => &[Face::Side],
        ViewMode::Top => &[Face::Top],
        ViewMode::Split => &[Face::Front, Face::Side, Face::Top],
    }
}

/// Screen size needed to show every panel of `view` for a volume of `dims` voxels.
pub fn layout_size(view: ViewMode, dims: IVec3) -> (u16, u16) {
    let mut w: u16 = 0;
    let mut h: u16 = 0;
    for (i, face) in faces(view).iter().enumerate() {
        let (across, down, _) = face.axes();
        if i > 0 {
            w = w.saturating_add(PANEL_GAP);
        }
        w = w.saturating_add((dims[across] as u16).saturating_mul(VOXEL_WIDTH));
        h = h.max(dims[down] as u16);
    }
    (w, h)
}

/// Brightest voxel along the collapsed axis.
fn brightest(frame: &VoxelFrame, face: Face, u: i32, v: i32) -> Color {
    let (across, down, depth) = face.axes();
    let mut at = IVec3::ZERO;
    at[across] = u;
    at[down] = v;

    let mut best = Color::BLACK;
    for w in 0..frame.dims()[depth] {
        at[depth] = w;
        if let Some(c) = frame.get(at) {
            if c.luma() > best.luma() {
                best = c;
            }
        }
    }
    best
}

/// Draws orthographic projections of the volume, centered on the screen.
pub fn project(frame: &VoxelFrame, view: ViewMode, mode: ColorMode, screen: &mut Screen) {
    let dims = frame.dims();
    let (w, h) = layout_size(view, dims);
    let mut x0 = screen.width.saturating_sub(w) / 2;
    let y0 = screen.height.saturating_sub(h) / 2;

    for &face in faces(view) {
        let (across, down, _) = face.axes();
        for v in 0..dims[down] {
            let sy = y0.saturating_add(v as u16);
            for u in 0..dims[across] {
                let cell = Cell::lit(GLYPH, brightest(frame, face, u, v).to_term(mode));
                let sx = x0.saturating_add(u as u16 * VOXEL_WIDTH);
                for k in 0..VOXEL_WIDTH {
                    screen.set(sx.saturating_add(k), sy, cell);
                }
            }
        }
        x0 = x0
            .saturating_add((dims[across] as u16).saturating_mul(VOXEL_WIDTH))
            .saturating_add(PANEL_GAP);
    }
}
