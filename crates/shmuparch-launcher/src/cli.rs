//! Command line arguments

use clap::Parser;
use shmuparch_emulator::{EmulatorCore, RuntimeOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shmuparch")]
#[command(about = "Low-latency shmup launcher", long_about = None)]
pub(crate) struct Cli {
    /// Configuration file, used instead of the system and user files
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// ROM directory
    #[arg(long)]
    pub roms: Option<PathBuf>,

    /// Stream to MiSTer FPGA (CRT output)
    #[arg(long)]
    pub mister: bool,

    /// Use the MAME core
    #[arg(long, conflicts_with = "fbneo")]
    pub mame: bool,

    /// Use the FinalBurn Neo core
    #[arg(long)]
    pub fbneo: bool,

    /// Print the launch specification as JSON instead of launching
    #[arg(long)]
    pub dry_run: bool,

    /// List games whose ROMs are missing
    #[arg(long)]
    pub show_missing: bool,

    /// ROM name or ROM file to launch without the menu
    pub rom: Option<String>,
}

impl Cli {
    pub fn runtime_options(&self) -> RuntimeOptions {
        let mut options = RuntimeOptions::new();
        if self.mame {
            options = options.with_core(EmulatorCore::Mame);
        } else if self.fbneo {
            options = options.with_core(EmulatorCore::FbNeo);
        }
        if self.mister {
            options = options.with_mister();
        }
        options
    }
}
