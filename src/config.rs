// Copyright (c) 2026 rezky_nightky

use std::fmt::Display;
use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use glam::IVec3;
use thiserror::Error;

use crate::engine::EngineConfig;
use crate::palette::{DEFAULT_PHASE_COUNT, PHASES};
use crate::runtime::ViewMode;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  cuberain --size 24 --view front --fps 40 --fade 0.9 --spawn 4 --speed 0.5 --color-phases 2 --step-every 1";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: String },
    #[error("invalid --colormode: {0} (allowed: 0,16,8,256,24,32)")]
    ColorMode(u16),
}

fn require_range<T>(name: &'static str, v: T, min: T, max: T) -> Result<T, ConfigError>
where
    T: PartialOrd + Display + Copy,
{
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(v)
}

fn require_finite_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite {
            name,
            value: v.to_string(),
        });
    }
    require_range(name, v, min, max)
}

/// Log filter directives. `RUST_LOG` (default `info`) only applies when logging to a
/// file; the terminal path is capped at errors.
pub fn log_directives(to_file: bool, rust_log: Option<&str>) -> &str {
    if !to_file {
        return "error";
    }
    match rust_log.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => "info",
    }
}

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        if !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase() {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            out.push_str("      \x1b[32mExample:\x1b[0m");
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix("  cuberain") {
            out.push_str("  \x1b[1;34mcuberain\x1b[0m");
            out.push_str(rest);
        } else if line.starts_with("  -") {
            out.push_str("\x1b[33m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "cuberain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'n',
        long = "size",
        default_value_t = 24,
        help_heading = "CUBE",
        help = "Voxels per cube edge (min 2 max 64)"
    )]
    pub size: i32,

    #[arg(
        short = 'V',
        long = "view",
        default_value_t = ViewMode::Front,
        value_enum,
        help_heading = "CUBE",
        help = "Projection shown in the terminal (front, side, top, split)"
    )]
    pub view: ViewMode,

    #[arg(
        long = "colormode",
        help_heading = "CUBE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 40.0,
        help_heading = "RAIN",
        help = "Simulation ticks per second (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        short = 'F',
        long = "fade",
        default_value_t = 0.9,
        help_heading = "RAIN",
        help = "Trail fade factor per tick (min 0.05 max 1)"
    )]
    pub fade: f64,

    #[arg(
        short = 'd',
        long = "spawn",
        default_value_t = 4,
        help_heading = "RAIN",
        help = "Drops spawned per tick (min 0 max 64)"
    )]
    pub spawn: usize,

    #[arg(
        short = 'S',
        long = "speed",
        default_value_t = 0.5,
        help_heading = "RAIN",
        help = "Horizontal drop speed in voxels per tick (min 0.01 max 4)"
    )]
    pub speed: f64,

    #[arg(
        short = 'c',
        long = "color-phases",
        default_value_t = DEFAULT_PHASE_COUNT,
        help_heading = "RAIN",
        help = "Color phases cycled by the color button (min 1 max 6)"
    )]
    pub color_phases: u8,

    #[arg(
        long = "step-every",
        default_value_t = 1,
        help_heading = "RAIN",
        help = "Advance drops on every N-th tick only (min 1, capped at the tick rate)"
    )]
    pub step_every: u32,

    #[arg(
        long = "seed",
        help_heading = "RAIN",
        help = "Seed for a reproducible rain"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with RUST_LOG); without it only errors reach stderr"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-phases",
        help_heading = "HELP",
        help = "List the color phases and exit"
    )]
    pub list_phases: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated run settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub engine: EngineConfig,
    pub fps: f64,
    pub view: ViewMode,
    pub duration_s: Option<f64>,
}

impl Args {
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let size = require_range("--size", self.size, 2, 64)?;
        let fps = require_finite_range("--fps", self.fps, 1.0, 240.0)?;
        let fade = require_finite_range("--fade", self.fade, 0.05, 1.0)?;
        let spawn = require_range("--spawn", self.spawn, 0, 64)?;
        let speed = require_finite_range("--speed", self.speed, 0.01, 4.0)?;
        let color_phases =
            require_range("--color-phases", self.color_phases, 1, PHASES.len() as u8)?;
        let step_every = require_range("--step-every", self.step_every, 1, u32::MAX)?;

        let duration_s = match self.duration {
            None => None,
            Some(s) if !s.is_finite() => {
                return Err(ConfigError::NotFinite {
                    name: "--duration",
                    value: s.to_string(),
                })
            }
            Some(s) if s <= 0.0 => None,
            Some(s) => Some(require_range("--duration", s, 0.1, 86400.0)?),
        };

        Ok(Settings {
            engine: EngineConfig {
                max_bound: IVec3::splat(size - 1),
                spawn_per_tick: spawn,
                drop_speed: speed as f32,
                fade_factor: fade as f32,
                color_phases,
                step_every,
                seed: self.seed,
            },
            fps,
            view: self.view,
            duration_s,
        })
    }
}

pub fn print_list_phases() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mCOLOR PHASES:\x1b[0m");
    } else {
        println!("COLOR PHASES:");
    }
    println!("NOTE: the color button cycles through the first N phases (--color-phases N).");
    println!();
    println!("PHASE  NAME    CHANNELS (r, g, b)");
    for (i, rule) in PHASES.iter().enumerate() {
        println!(
            "{:<6} {:<7} ({:?}, {:?}, {:?}){}",
            i,
            rule.name,
            rule.r,
            rule.g,
            rule.b,
            if rule.scaled { " dimmed randomly" } else { "" }
        );
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  cuberain [OPTIONS]\n\nCUBE:\n  -n, --size <voxels>\n      Voxels per cube edge (min 2 max 64).\n      Example: cuberain --size 16\n\n  -V, --view <front|side|top|split>\n      Projection shown in the terminal; Tab cycles it while running.\n      Example: cuberain --view split\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: cuberain --colormode 24\n\nRAIN:\n  -f, --fps <number>\n      Simulation ticks per second (min 1 max 240).\n      Example: cuberain --fps 30\n\n  -F, --fade <number>\n      Trail fade factor per tick (min 0.05 max 1); 1 keeps trails forever.\n      Example: cuberain --fade 0.7\n\n  -d, --spawn <number>\n      Drops spawned per tick (min 0 max 64).\n      Example: cuberain --spawn 8\n\n  -S, --speed <number>\n      Horizontal drop speed in voxels per tick (min 0.01 max 4).\n      Example: cuberain --speed 0.25\n\n  -c, --color-phases <number>\n      Color phases cycled by the color button (min 1 max 6, default 2).\n      Example: cuberain --color-phases 6\n\n  --step-every <number>\n      Advance drops on every N-th tick only.\n      Example: cuberain --step-every 2\n\n  --seed <number>\n      Seed for a reproducible rain.\n      Example: cuberain --seed 42\n\nGENERAL:\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: cuberain --duration 10\n\n  -s, --screensaver\n      Exit on any keypress.\n      Example: cuberain -s\n\n  --log-file <path>\n      Write logs to a file; RUST_LOG selects the level.\n      Without it only errors are logged, to stderr.\n      Example: RUST_LOG=debug cuberain --log-file rain.log\n\nKEYS:\n  c, Enter        next color phase (button 0)\n  p               pause / resume (button 3)\n  -, Left         shorter trails (button 6)\n  +, Right        longer trails (button 7)\n  Tab             next view\n  Space           clear the rain\n  q, Esc          quit\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }
    println!();
    print_list_phases();
}
