//! Models command - manage the classifier weights.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use deepcheck_adapters::models::{
    all_models_installed, fetch_models as adapter_fetch_models,
    list_models as adapter_list_models, models_dir, set_models_dir, sha256_file, Download,
    MODELS,
};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::AppConfig;

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Models subcommands
#[derive(Subcommand)]
pub enum ModelsCommand {
    /// Download missing models
    Fetch {
        /// Base URL serving `g1.safetensors` and `g2.safetensors`
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },
    /// List installed models
    List,
    /// Print model directory path
    Path,
}

/// Run the models command.
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<()> {
    if let Some(dir) = args.models_dir.as_ref().or(config.models.dir.as_ref()) {
        set_models_dir(dir.clone());
    }

    match args.command {
        ModelsCommand::Fetch { ref base_url } => fetch_models(base_url.as_deref(), config),
        ModelsCommand::List => list_models(config),
        ModelsCommand::Path => print_path(),
    }
}

fn fetch_models(base_url: Option<&str>, config: &AppConfig) -> Result<()> {
    let base_url = base_url
        .or(config.models.base_url.as_deref())
        .context("No download location. Pass --base-url or set models.base_url in the config")?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
            .map_err(|e| anyhow::anyhow!("Invalid progress template: {e}"))?
            .progress_chars("#>-"),
    );

    let mut current = String::new();
    let fetched = adapter_fetch_models(base_url, &config.models.checksums(), |d: Download<'_>| {
        if current != d.model {
            d.model.clone_into(&mut current);
            pb.set_length(d.total.unwrap_or(0));
            pb.set_message(d.model.to_string());
        }
        pb.set_position(d.received);
    })?;

    if fetched.is_empty() {
        pb.finish_and_clear();
        println!("All models already installed in {}", models_dir().display());
    } else {
        pb.finish_with_message(format!("Downloaded {} model(s)", fetched.len()));
    }
    Ok(())
}

fn list_models(config: &AppConfig) -> Result<()> {
    let models = adapter_list_models();
    let dir = models_dir();
    let checksums = config.models.checksums();

    println!("Models directory: {}", dir.display());
    println!();

    for (name, installed) in &models {
        let status = if *installed { "✓" } else { "✗" };
        let info = MODELS.iter().find(|m| m.name == name);
        let filename = info.map_or("unknown", |m| m.filename);
        let description = info.map_or("", |m| m.description);
        println!("  {status} {name} ({filename}) - {description}");

        if let Some(expected) = checksums.get(name).filter(|_| *installed) {
            let hash = sha256_file(&dir.join(filename))?;
            if !hash.eq_ignore_ascii_case(expected) {
                println!("    checksum mismatch: expected {expected}, got {hash}");
            }
        }
    }

    println!();
    let installed_count = models.iter().filter(|(_, installed)| *installed).count();
    println!("{}/{} models installed", installed_count, models.len());
    if !all_models_installed() {
        println!("Run `deepcheck models fetch --base-url <URL>` to download missing models");
    }

    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn print_path() -> Result<()> {
    println!("{}", models_dir().display());
    Ok(())
}
