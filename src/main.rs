//! sectioncfg: section-keyed YAML configuration tool
//!
//! A CLI for inspecting sections as the application would see them, checking
//! every section against its schema, and saving validated section documents.

mod cli;
mod settings;

use std::fs;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};

use cli::{Cli, Commands, Format};
use sectioncfg::domain::logger;
use sectioncfg::Config;
use settings::SettingsService;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Init { path } => {
            let settings_path = if let Some(p) = path {
                SettingsService::generate_at(&p)?;
                p
            } else {
                SettingsService::generate_default()?;
                SettingsService::default_path()
            };
            if !quiet {
                eprintln!("Settings file created at: {}", settings_path.display());
            }
        }
        Commands::Version => {
            println!("sectioncfg {}", env!("CARGO_PKG_VERSION"));
        }
        command => {
            // Load settings
            let settings = SettingsService::load(cli.settings.as_deref())?;

            // Initialize logging if debug mode
            if cli.debug || settings.debug {
                logger::init(&settings.log_path, tracing::Level::DEBUG)?;
            }

            let config = SettingsService::build_config(&settings)?;
            run(command, &config, quiet)?;
        }
    }

    Ok(())
}

/// Execute a command that needs the loaded configuration.
fn run(command: Commands, config: &Config, quiet: bool) -> Result<()> {
    match command {
        Commands::Show { section, format } => {
            let values = config.get(&section)?;
            let rendered = match format {
                Format::Yaml => serde_yaml::to_string(&*values)?,
                Format::Json => serde_json::to_string_pretty(&*values)?,
            };
            println!("{}", rendered.trim_end());
        }
        Commands::Check => {
            let mut failures = 0;
            for name in config.schema().section_names() {
                match config.get(name) {
                    Ok(_) => {
                        info!("Section '{}' is valid", name);
                        if !quiet {
                            eprintln!("{}: ok", name);
                        }
                    }
                    Err(e) => {
                        error!("Section '{}' failed: {}", name, e);
                        eprintln!("{}: {}", name, e);
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                bail!("{} section(s) failed validation", failures);
            }
            if !quiet {
                eprintln!("Configuration is valid.");
            }
        }
        Commands::Save { section, file } => {
            let contents = fs::read(&file)
                .with_context(|| format!("Failed to read document: {}", file.display()))?;
            config.save(&section, &contents)?;
            if !quiet {
                eprintln!("Section '{}' saved.", section);
            }
        }
        Commands::Sections => {
            for name in config.schema().section_names() {
                println!("{}", name);
            }
        }
        Commands::Init { .. } | Commands::Version => {}
    }

    Ok(())
}
