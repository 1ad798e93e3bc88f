// Copyright (c) 2026 rezky_nightky

use std::ops::{Mul, MulAssign};

use crossterm::style::Color as TermColor;

use crate::runtime::ColorMode;

/// 8-bit RGB voxel color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn set_r(&mut self, v: u8) {
        self.r = v;
    }

    pub fn set_g(&mut self, v: u8) {
        self.g = v;
    }

    pub fn set_b(&mut self, v: u8) {
        self.b = v;
    }

    pub fn is_black(self) -> bool {
        self == Color::BLACK
    }

    pub fn luma(self) -> u16 {
        self.r as u16 + self.g as u16 + self.b as u16
    }

    /// Maps the color onto what the terminal can display. `None` means "terminal default".
    pub fn to_term(self, mode: ColorMode) -> Option<TermColor> {
        if self.is_black() {
            return None;
        }
        let Color { r, g, b } = self;
        match mode {
            ColorMode::Mono => Some(TermColor::White),
            ColorMode::TrueColor => Some(TermColor::Rgb { r, g, b }),
            ColorMode::Color256 => Some(TermColor::AnsiValue(rgb_to_ansi256(r, g, b))),
            ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
        }
    }
}

fn scale_channel(v: u8, factor: f32) -> u8 {
    // Truncation so that repeated fading below 1.0 ends in exact black.
    (v as f32 * factor).clamp(0.0, 255.0) as u8
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, factor: f32) -> Color {
        Color {
            r: scale_channel(self.r, factor),
            g: scale_channel(self.g, factor),
            b: scale_channel(self.b, factor),
        }
    }
}

impl MulAssign<f32> for Color {
    fn mul_assign(&mut self, factor: f32) {
        *self = *self * factor;
    }
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let step = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (step(r), step(g), step(b));
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;
    let cube_rgb = (
        LEVELS[r6 as usize],
        LEVELS[g6 as usize],
        LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray_v) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let i = (avg - 8) / 10;
            (232 + i, 8 + 10 * i)
        }
    };

    if dist2((r, g, b), (gray_v, gray_v, gray_v)) < dist2((r, g, b), cube_rgb) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> TermColor {
    const TABLE: [(TermColor, (u8, u8, u8)); 16] = [
        (TermColor::Black, (0, 0, 0)),
        (TermColor::DarkGrey, (128, 128, 128)),
        (TermColor::Grey, (192, 192, 192)),
        (TermColor::White, (255, 255, 255)),
        (TermColor::DarkRed, (128, 0, 0)),
        (TermColor::Red, (255, 0, 0)),
        (TermColor::DarkGreen, (0, 128, 0)),
        (TermColor::Green, (0, 255, 0)),
        (TermColor::DarkBlue, (0, 0, 128)),
        (TermColor::Blue, (0, 0, 255)),
        (TermColor::DarkCyan, (0, 128, 128)),
        (TermColor::Cyan, (0, 255, 255)),
        (TermColor::DarkMagenta, (128, 0, 128)),
        (TermColor::Magenta, (255, 0, 255)),
        (TermColor::DarkYellow, (128, 128, 0)),
        (TermColor::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2((r, g, b), *rgb))
        .map(|(c, _)| *c)
        .unwrap_or(TermColor::White)
}
