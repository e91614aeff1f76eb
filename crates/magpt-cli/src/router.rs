//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use magpt_config::{ClientSettings, SettingsLoader};

use crate::error::CliResult;

/// magpt - chat with the Modern Assyrian GPT backend from the terminal
#[derive(Parser, Debug, Default)]
#[command(name = "magpt")]
#[command(bin_name = "magpt")]
#[command(about = "Terminal chat client for the Modern Assyrian GPT backend")]
#[command(version)]
pub struct Cli {
    /// API base URL (saved to your preferences)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Origin used when no API URL is set
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,

    /// Client settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for saved preferences
    #[arg(long, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Client settings with command-line overrides applied
    pub fn load_settings(&self) -> CliResult<ClientSettings> {
        let loader = match &self.config {
            Some(path) => SettingsLoader::with_path(path.clone()),
            None => SettingsLoader::new(),
        };
        let mut settings = loader.load()?;

        if let Some(origin) = &self.origin {
            settings.origin = origin.clone();
        }
        if let Some(dir) = &self.storage_dir {
            settings.storage_dir = dir.clone();
        }
        Ok(settings)
    }
}
