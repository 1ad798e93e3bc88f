// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;

/// Terminal-sized grid of cells remembering which ones changed since the last draw.
#[derive(Clone, Debug)]
pub struct Screen {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty_all = true;
    }

    pub fn clear_dirty(&mut self) {
        for &i in &self.dirty {
            self.dirty_map[i] = false;
        }
        self.dirty.clear();
        self.dirty_all = false;
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
        self.dirty_all = true;
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    /// Writes a cell; anything off-screen is silently clipped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}
