use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use wavecrest::config::clamp_sensitivity;
use wavecrest::{analyze, Cli};

fn main() -> Result<()> {
    // A. Init logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse args
    let args = Cli::parse();
    if args.inputs.is_empty() {
        anyhow::bail!("no input files given (expected JSON arrays of close prices)");
    }
    let sensitivity = clamp_sensitivity(args.sensitivity);

    // C. Analyze every input; files are independent, so fan out
    let reports: Vec<(PathBuf, Result<String>)> = args
        .inputs
        .par_iter()
        .map(|path| (path.clone(), analyze_file(path, sensitivity, args.pretty)))
        .collect();

    let mut failures = 0usize;
    for (path, rendered) in reports {
        match rendered {
            Ok(json) => {
                log::info!(
                    "{} analyzed at {}",
                    path.display(),
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
                );
                println!("{json}");
            }
            Err(err) => {
                failures += 1;
                log::error!("{}: {:#}", path.display(), err);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} input(s) failed");
    }
    Ok(())
}

fn analyze_file(path: &Path, sensitivity: f64, pretty: bool) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let prices: Vec<f64> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as a JSON array of closes", path.display()))?;

    let report = analyze(&prices, sensitivity)?;
    log::info!(
        "{}: {} ({}), confidence {:.2}",
        path.display(),
        report.trading_signal.direction,
        report.trading_signal.trend,
        report.trading_signal.confidence
    );
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}
