// Copyright (c) 2026 rezky_nightky

use std::io::Result;

use glam::IVec3;

use crate::color::Color;
use crate::display::VoxelDisplay;
use crate::frame::VoxelFrame;
use crate::runtime::{ColorMode, ViewMode};
use crate::screen::Screen;
use crate::terminal::Terminal;
use crate::view;

/// Voxel display backed by the terminal: voxels live in a [`VoxelFrame`] and every
/// render projects them onto the screen and writes what changed.
pub struct TerminalCube {
    frame: VoxelFrame,
    screen: Screen,
    term: Terminal,
    view: ViewMode,
    color_mode: ColorMode,
}

impl TerminalCube {
    pub fn new(
        term: Terminal,
        max_bound: IVec3,
        tick_rate: u32,
        view: ViewMode,
        color_mode: ColorMode,
    ) -> Result<Self> {
        let (w, h) = term.size()?;
        Ok(Self {
            frame: VoxelFrame::new(max_bound, tick_rate),
            screen: Screen::new(w, h),
            term,
            view,
            color_mode,
        })
    }

    pub fn frame(&self) -> &VoxelFrame {
        &self.frame
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        self.screen.clear();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Screen::new(width, height);
    }

    /// Blanks the volume and forces a full redraw.
    pub fn clear(&mut self) {
        self.frame.clear();
        self.screen.clear();
    }

    /// Redraws the last frame without presenting a new one.
    pub fn redraw(&mut self) -> Result<()> {
        self.screen.mark_all_dirty();
        view::project(&self.frame, self.view, self.color_mode, &mut self.screen);
        self.term.draw(&mut self.screen)
    }
}

impl VoxelDisplay for TerminalCube {
    fn set_pixel(&mut self, at: IVec3, color: Color) {
        self.frame.set_pixel(at, color);
    }

    fn fade(&mut self, factor: f32) {
        self.frame.fade(factor);
    }

    fn render(&mut self) -> Result<()> {
        self.frame.render()?;
        view::project(&self.frame, self.view, self.color_mode, &mut self.screen);
        self.term.draw(&mut self.screen)
    }

    fn tick_rate(&self) -> u32 {
        self.frame.tick_rate()
    }
}
