// Copyright (c) 2026 rezky_nightky

mod cell;
mod color;
mod config;
mod display;
mod droplet;
mod engine;
mod frame;
mod host;
mod input;
mod palette;
mod particle;
mod runtime;
mod screen;
mod terminal;
mod view;

use std::env;
use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, log_directives, print_help_detail,
    print_list_phases, Args, ConfigError,
};
use crate::engine::ParticleEngine;
use crate::host::TerminalCube;
use crate::input::{button_for_key, Gamepad};
use crate::runtime::ColorMode;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("CUBERAIN_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    if term == "linux" || term == "ansi" {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> Result<ColorMode, ConfigError> {
    match args.colormode {
        None => Ok(detect_color_mode_auto()),
        Some(0) => Ok(ColorMode::Mono),
        Some(16) => Ok(ColorMode::Color16),
        Some(8) | Some(256) => Ok(ColorMode::Color256),
        Some(24) | Some(32) => Ok(ColorMode::TrueColor),
        Some(m) => Err(ConfigError::ColorMode(m)),
    }
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

/// Logs go to `--log-file` when given. Stderr shares the alternate screen, so it only
/// ever carries errors.
fn init_logging(args: &Args) -> std::io::Result<()> {
    let rust_log = env::var("RUST_LOG").ok();
    let filter = EnvFilter::new(log_directives(args.log_file.is_some(), rust_log.as_deref()));
    match &args.log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn exit_with(e: ConfigError) -> ! {
    eprintln!("{}", e);
    std::process::exit(1);
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_phases {
        print_list_phases();
        return Ok(());
    }

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let color_mode = detect_color_mode(&args).unwrap_or_else(|e| exit_with(e));

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Color: {}", color_mode_label(color_mode));
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let settings = args.settings().unwrap_or_else(|e| exit_with(e));
    init_logging(&args)?;

    let tick_rate = settings.fps.round() as u32;
    let mut engine: ParticleEngine<Gamepad> =
        ParticleEngine::with_devices(settings.engine.clone(), [Gamepad::new()]);

    let term = Terminal::new()?;
    let mut cube = TerminalCube::new(
        term,
        settings.engine.max_bound,
        tick_rate,
        settings.view,
        color_mode,
    )?;

    info!(
        size = engine.config().max_bound.x + 1,
        fps = settings.fps,
        view = settings.view.label(),
        color = color_mode_label(color_mode),
        build = build_info(),
        "rain started"
    );

    let start_time = Instant::now();
    let end_time = settings
        .duration_s
        .map(|s| start_time + Duration::from_secs_f64(s));

    let target_period = Duration::from_secs_f64(1.0 / settings.fps);
    let mut next_frame = Instant::now();
    let mut raining = true;

    while raining {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;
        let mut needs_redraw = false;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            raining = false;
                            break;
                        }

                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => raining = false,
                            KeyCode::Char(' ') => {
                                engine.reset();
                                cube.clear();
                                needs_redraw = true;
                            }
                            KeyCode::Tab => {
                                let next = cube.view().next();
                                debug!(view = next.label(), "view changed");
                                cube.set_view(next);
                                needs_redraw = true;
                            }
                            code => {
                                if let (Some(b), Some(pad)) =
                                    (button_for_key(code), engine.devices_mut().first_mut())
                                {
                                    pad.press(b);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }

            if !raining || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !raining {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            debug!(width = nw, height = nh, "terminal resized");
            cube.resize(nw, nh);
            needs_redraw = true;
        }

        engine.tick(&mut cube)?;
        // Paused ticks present nothing, so view changes must be drawn here.
        if needs_redraw && engine.is_paused() {
            cube.redraw()?;
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    let devices = engine.detach_devices();
    info!(
        elapsed_s = start_time.elapsed().as_secs_f64(),
        ticks = engine.ticks(),
        presents = cube.frame().presents(),
        lit = cube.frame().lit_count(),
        live_drops = engine.drops().len(),
        fade = engine.fade_factor(),
        phase = engine.color_phase(),
        color = ?engine.spawn_color(),
        devices = devices.len(),
        "rain stopped"
    );

    Ok(())
}
