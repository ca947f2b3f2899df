//! ShmupArch Launcher
//!
//! A TUI browser over a curated catalog of arcade shmups. Filters and sorts
//! the catalog as you type and launches the selection in RetroArch, either
//! locally or streamed to a MiSTer.

mod app;
mod cli;
mod ui;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::{Action, App};
use cli::Cli;
use shmuparch_catalog::Catalog;
use shmuparch_config::ShmuparchConfig;
use shmuparch_emulator::{
    EmulatorLauncher, LaunchCommand, LaunchResolver, LaunchSpec, RuntimeOptions,
};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// `--dry-run` output
#[derive(Serialize)]
struct DryRun<'a> {
    spec: &'a LaunchSpec,
    command: &'a LaunchCommand,
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join("shmuparch");
    std::fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("shmuparch.log"))
        .ok()
}

/// Log to the cache directory while the TUI owns the terminal, else stderr
fn init_logging(tui: bool) {
    if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(log_filter())
            .with_writer(io::stderr)
            .init();
        return;
    }

    match open_log_file() {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(log_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(log_filter())
            .with_writer(io::sink)
            .init(),
    }
}

fn load_config(cli: &Cli) -> Result<ShmuparchConfig> {
    let mut config = match &cli.config {
        Some(path) => ShmuparchConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ShmuparchConfig::load_default().context("Failed to load configuration")?,
    };

    if let Some(roms) = &cli.roms {
        config.paths.rom_dir = roms.clone();
    }
    Ok(config)
}

/// Load and scan the catalog. Invalid catalog data aborts here, before the
/// terminal is touched.
fn load_catalog(config: &ShmuparchConfig) -> Result<Catalog> {
    let mut catalog = match &config.paths.catalog {
        Some(path) => Catalog::load_from_path(path)
            .with_context(|| format!("Invalid catalog {}", path.display()))?,
        None => Catalog::load().context("Invalid built-in catalog")?,
    };

    catalog.rescan(LaunchResolver::new(config).checker());
    Ok(catalog)
}

/// Resolve a ROM name or path given on the command line
fn resolve_direct(
    rom: &str,
    catalog: &Catalog,
    config: &ShmuparchConfig,
    options: &RuntimeOptions,
) -> Result<LaunchSpec> {
    let resolver = LaunchResolver::new(config);

    if rom.contains('/') {
        let path = PathBuf::from(rom);
        if path.is_file() {
            return Ok(resolver.resolve_file(&path, options));
        }
    }

    let key = resolver.checker().rom_key(rom);
    if let Some((entry, variant)) = catalog.find_rom(key) {
        return resolver
            .resolve(entry, Some(&variant.rom), options)
            .map_err(anyhow::Error::from);
    }

    match resolver.checker().rom_path(key) {
        Some(path) => Ok(resolver.resolve_file(&path, options)),
        None => bail!("ROM not found: {}", resolver.checker().expected_path(key).display()),
    }
}

fn run_direct(cli: &Cli, rom: &str, catalog: &Catalog, config: &ShmuparchConfig) -> Result<()> {
    let spec = resolve_direct(rom, catalog, config, &cli.runtime_options())?;
    let launcher = EmulatorLauncher::new(config);

    if cli.dry_run {
        let command = launcher.command(&spec);
        let out = serde_json::to_string_pretty(&DryRun {
            spec: &spec,
            command: &command,
        })?;
        println!("{}", out);
        return Ok(());
    }

    let status = launcher.launch(&spec)?.wait()?;
    if !status.success() {
        bail!("RetroArch exited with {}", status);
    }
    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Hand the terminal to the emulator until it exits
fn launch_from_tui(terminal: &mut Tui, app: &mut App, spec: &LaunchSpec) -> Result<()> {
    restore_terminal(terminal)?;

    let launcher = EmulatorLauncher::new(app.config());
    app.status = match launcher.launch(spec).and_then(|running| running.wait()) {
        Ok(status) if status.success() => format!("Played {}", spec.title),
        Ok(status) => format!("RetroArch exited with {}", status),
        Err(e) => {
            error!("Failed to launch {}: {}", spec.variant.rom, e);
            format!("Error: {}", e)
        }
    };

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    Ok(())
}

fn run_tui(app: &mut App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app);
    restore_terminal(&mut terminal)?;
    result
}

fn event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::draw_ui(f, app))?;

        if !event::poll(tick_rate)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::None => {}
            Action::Launch(spec) => launch_from_tui(terminal, app, &spec)?,
            Action::Quit => return Ok(()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.rom.is_none());

    info!("ShmupArch starting...");

    let config = load_config(&cli)?;
    let catalog = load_catalog(&config)?;

    if let Some(rom) = &cli.rom {
        return run_direct(&cli, rom, &catalog, &config);
    }

    check_dependencies(&config, &cli.runtime_options())?;

    let mut app = App::new(catalog, config, cli.runtime_options(), cli.show_missing);
    run_tui(&mut app)?;

    info!("ShmupArch exiting");
    Ok(())
}

/// Fail early when the emulator cannot possibly start
fn check_dependencies(config: &ShmuparchConfig, options: &RuntimeOptions) -> Result<()> {
    let remote = options.mister || config.mister.enabled;
    let base = if remote {
        config.paths.mister_config_file()
    } else {
        config.paths.config_file()
    };
    require(&base, "Config not found")?;
    require(&config.paths.fbneo_core(), "FBNeo core not found")?;

    let retroarch = if remote {
        &config.emulator.mister_retroarch_bin
    } else {
        &config.emulator.retroarch_bin
    };
    which::which(retroarch)
        .with_context(|| format!("RetroArch not found: {}", retroarch.display()))?;
    Ok(())
}

fn require(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{}: {}", what, path.display());
    }
    Ok(())
}
