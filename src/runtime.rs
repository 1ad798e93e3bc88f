// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

/// Which faces of the cube are projected onto the terminal.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// Looking at the front face: x across, depth down.
    #[value(name = "front")]
    Front,
    /// Looking at the side face: y across, depth down.
    #[value(name = "side")]
    Side,
    /// Looking down from the top face: x across, y down.
    #[value(name = "top")]
    Top,
    /// Front, side and top next to each other.
    #[value(name = "split")]
    Split,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Front => ViewMode::Side,
            ViewMode::Side => ViewMode::Top,
            ViewMode::Top => ViewMode::Split,
            ViewMode::Split => ViewMode::Front,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Front => "front",
            ViewMode::Side => "side",
            ViewMode::Top => "top",
            ViewMode::Split => "split",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ViewMode;

    #[test]
    fn next_cycles_through_every_view() {
        let mut v = ViewMode::Front;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(v);
            v = v.next();
        }
        assert_eq!(v, ViewMode::Front);
        assert_eq!(
            seen,
            vec![ViewMode::Front, ViewMode::Side, ViewMode::Top, ViewMode::Split]
        );
    }
}
