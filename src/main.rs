mod analysis;
mod audio;
mod cli;
mod config;
mod error;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use analysis::result::AnalysisReport;
use analysis::AnalysisParams;
use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect trackscan.toml /
    // the platform config dir.
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("trackscan.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("trackscan").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("trackscan").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });

    let params = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg.params()
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                AnalysisParams::default()
            }
        },
        None => AnalysisParams::default(),
    };

    let reports = if cli.inputs.len() == 1 {
        vec![analysis::analyze_file(&cli.inputs[0], &params)]
    } else {
        // Invocations share no state, so files analyze in parallel.
        log::info!("Analyzing {} files...", cli.inputs.len());
        let pb = ProgressBar::new(cli.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files")
                .unwrap()
                .progress_chars("=>-"),
        );
        let reports: Vec<AnalysisReport> = cli
            .inputs
            .par_iter()
            .map(|path| {
                let report = analysis::analyze_file(path, &params);
                pb.inc(1);
                report
            })
            .collect();
        pb.finish_and_clear();
        reports
    };

    let json = if cli.inputs.len() == 1 {
        serialize(&reports[0], cli.compact)?
    } else {
        serialize(&reports, cli.compact)?
    };

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Wrote report to {}", path.display());
        }
        None => println!("{}", json),
    }

    // Collaborators key off the exit status: zero only when every input
    // analyzed successfully.
    if reports.iter().any(|r| !r.is_success()) {
        std::process::exit(1);
    }
    Ok(())
}

fn serialize<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}
