//! RetroArch process launching

use crate::{EmulatorCore, EmulatorError, LaunchSpec, OutputTarget};
use serde::Serialize;
use shmuparch_config::ShmuparchConfig;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// A fully formatted RetroArch invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Variables added to the inherited environment
    pub env: BTreeMap<String, String>,
    /// Where the generated append-config is written
    pub append_path: PathBuf,
    /// Generated append-config contents
    pub append_config: String,
    /// Generated core options file with the DIP switch set, when one is set
    pub core_options: Option<CoreOptions>,
}

/// A core options (`.opt`) file referenced through `core_options_path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreOptions {
    pub path: PathBuf,
    pub contents: String,
}

impl LaunchCommand {
    /// Format the command for a spec.
    ///
    /// Spawns nothing and writes nothing. The performance wrapper and the
    /// per-game override file are only used when they exist.
    pub fn build(spec: &LaunchSpec, config: &ShmuparchConfig, append_path: &Path) -> Self {
        let emulator = &config.emulator;
        let remote = spec.output.is_remote();

        let retroarch = if remote {
            emulator.mister_retroarch_bin.clone()
        } else {
            emulator.retroarch_bin.clone()
        };

        let wrapper = emulator
            .performance_wrapper
            .as_ref()
            .filter(|w| !remote && w.is_file());

        let mut append = Vec::new();
        if spec.override_config.is_file() {
            append.push(spec.override_config.display().to_string());
        }
        append.push(append_path.display().to_string());

        let mut args = Vec::new();
        let program = match wrapper {
            Some(wrapper) => {
                args.push(retroarch.display().to_string());
                wrapper.clone()
            }
            None => retroarch,
        };
        if remote {
            args.push("-v".to_string());
        }
        args.push("--config".to_string());
        args.push(spec.base_config.display().to_string());
        args.push("--appendconfig".to_string());
        args.push(append.join("|"));
        args.push("-L".to_string());
        args.push(spec.core_path.display().to_string());
        args.push(spec.rom_path.display().to_string());

        let mut env = BTreeMap::new();
        match &spec.output {
            OutputTarget::Local => {
                if emulator.gpu_offload {
                    env.extend(emulator.gpu_env.clone());
                }
            }
            OutputTarget::Remote { .. } => {
                // switchres needs xrandr
                env.insert("GDK_BACKEND".to_string(), "x11".to_string());
                env.insert("QT_QPA_PLATFORM".to_string(), "xcb".to_string());
            }
        }

        let core_options = (!spec.dip_switches.is_empty()).then(|| CoreOptions {
            path: append_path.with_extension("opt"),
            contents: core_options(spec),
        });

        Self {
            program,
            args,
            env,
            append_path: append_path.to_path_buf(),
            append_config: append_config(spec, core_options.as_ref().map(|o| o.path.as_path())),
            core_options,
        }
    }
}

/// RetroArch settings for one launch
fn append_config(spec: &LaunchSpec, options_path: Option<&Path>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# shmuparch: {} ({})", spec.title, spec.variant.rom);

    if spec.runahead > 0 {
        let _ = writeln!(out, "run_ahead_enabled = \"true\"");
        let _ = writeln!(out, "run_ahead_frames = \"{}\"", spec.runahead);
    } else {
        let _ = writeln!(out, "run_ahead_enabled = \"false\"");
    }

    // Core options are only read from an options file, never from frontend config
    if let Some(path) = options_path {
        let _ = writeln!(out, "global_core_options = \"true\"");
        let _ = writeln!(out, "core_options_path = \"{}\"", path.display());
    }
    out
}

/// DIP switch set as core options
fn core_options(spec: &LaunchSpec) -> String {
    let mut out = String::new();
    for (name, value) in &spec.dip_switches {
        let _ = writeln!(
            out,
            "{} = \"{}\"",
            dip_option(spec.core, &spec.variant.rom, name),
            value
        );
    }
    out
}

fn dip_option(core: EmulatorCore, rom: &str, name: &str) -> String {
    let name = name.trim().replace(' ', "_");
    match core {
        EmulatorCore::FbNeo => format!("fbneo-dipswitch-{}-{}", rom, name),
        EmulatorCore::Mame => format!("mame_dipswitch_{}", name),
    }
}

/// A running emulator
#[derive(Debug)]
pub struct LaunchResult {
    pub child: Child,
    pub pid: u32,
    pub core: EmulatorCore,
}

impl LaunchResult {
    /// Block until the emulator exits
    pub fn wait(mut self) -> Result<ExitStatus, EmulatorError> {
        let status = self.child.wait()?;
        tracing::info!("Emulator {} exited with {}", self.pid, status);
        Ok(status)
    }
}

/// Starts RetroArch for resolved launch specs
pub struct EmulatorLauncher {
    config: ShmuparchConfig,
    runtime_dir: PathBuf,
}

impl EmulatorLauncher {
    pub fn new(config: &ShmuparchConfig) -> Self {
        Self {
            config: config.clone(),
            runtime_dir: std::env::temp_dir().join("shmuparch"),
        }
    }

    /// Directory for generated append-configs
    pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = dir.into();
        self
    }

    pub fn command(&self, spec: &LaunchSpec) -> LaunchCommand {
        let append_path = self
            .runtime_dir
            .join(format!("{}.cfg", spec.variant.rom));
        LaunchCommand::build(spec, &self.config, &append_path)
    }

    /// Check that everything the command refers to is present
    pub fn verify(&self, spec: &LaunchSpec) -> Result<(), EmulatorError> {
        if !spec.rom_path.is_file() {
            return Err(EmulatorError::RomNotFound(spec.rom_path.clone()));
        }
        if !spec.core_path.is_file() {
            return Err(EmulatorError::CoreNotFound(spec.core_path.clone()));
        }
        if !spec.base_config.is_file() {
            return Err(EmulatorError::ConfigNotFound(spec.base_config.clone()));
        }

        let retroarch = if spec.output.is_remote() {
            &self.config.emulator.mister_retroarch_bin
        } else {
            &self.config.emulator.retroarch_bin
        };
        which::which(retroarch).map_err(|_| {
            EmulatorError::LaunchFailed(format!("RetroArch not found: {}", retroarch.display()))
        })?;
        Ok(())
    }

    /// Write the generated config files and spawn the emulator
    pub fn launch(&self, spec: &LaunchSpec) -> Result<LaunchResult, EmulatorError> {
        self.verify(spec)?;

        let command = self.command(spec);
        std::fs::create_dir_all(&self.runtime_dir)?;
        std::fs::write(&command.append_path, &command.append_config)?;
        if let Some(options) = &command.core_options {
            std::fs::write(&options.path, &options.contents)?;
        }

        tracing::info!(
            "Launching [{}] [{}]: {}",
            spec.output.label(),
            spec.core.tag(),
            spec.variant.rom
        );
        tracing::debug!("{} {}", command.program.display(), command.args.join(" "));

        let child = Command::new(&command.program)
            .args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| EmulatorError::LaunchFailed(format!("Failed to spawn process: {}", e)))?;

        let pid = child.id();
        tracing::info!("Emulator started with pid {}", pid);

        Ok(LaunchResult {
            child,
            pid,
            core: spec.core,
        })
    }
}
