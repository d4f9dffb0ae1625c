use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use puncture_trainer::acquisition::{
    RawReading, SampleSource, ScriptedSource, SyntheticSource,
};
use puncture_trainer::config::AppConfig;
use puncture_trainer::managers::SessionManager;

#[derive(Parser, Debug)]
#[command(
    name = "puncture_cli",
    about = "Deterministic replay harness for the puncture trainer engine"
)]
struct Cli {
    /// Override path to the JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded feed (CSV lines of `time,value`) through a session
    Replay {
        #[arg(long)]
        file: PathBuf,
        /// Skip the leading calibration window and use fallback thresholds
        #[arg(long)]
        skip_calibration: bool,
        /// Write the export table (JSON rows) to this path
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Run the synthetic probe signal end-to-end
    Simulate {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Write the export table (JSON rows) to this path
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    puncture_trainer::init_logging();
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Commands::Replay {
            file,
            skip_calibration,
            export,
        } => {
            let mut source = load_csv(&file)?;
            run_session(config, &mut source, skip_calibration, export)
        }
        Commands::Simulate { seed, export } => {
            let mut source = SyntheticSource::with_seed(seed);
            run_session(config, &mut source, false, export)
        }
    }
}

fn run_session(
    config: AppConfig,
    source: &mut dyn SampleSource,
    skip_calibration: bool,
    export: Option<PathBuf>,
) -> Result<ExitCode> {
    let manager = SessionManager::new(config);

    if !skip_calibration {
        let thresholds = manager.run_calibration(source)?;
        println!("{}", serde_json::to_string(&thresholds)?);
    }

    manager.begin_session()?;
    while let Some(reading) = source.next_reading() {
        if let Some(result) = manager.submit_raw(reading.timestamp, &reading.text)? {
            println!("{}", serde_json::to_string(&result)?);
            if result.auto_stop {
                break;
            }
        }
    }
    let outcome = manager.request_stop()?;

    let snapshot = manager.snapshot()?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    println!("Outcome: {:?}", outcome);

    if let Some(path) = export {
        let rows = manager.export_rows()?;
        let json = serde_json::to_string_pretty(&rows)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Exported {} rows to {}", rows.len(), path.display());
    }

    Ok(ExitCode::from(0))
}

/// Load a `time,value` CSV; the value column keeps its raw text so the
/// engine's parse/discard path sees exactly what the device sent.
fn load_csv(path: &PathBuf) -> Result<ScriptedSource> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut readings = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (time_text, value_text) = line
            .split_once(',')
            .with_context(|| format!("line {}: expected `time,value`", line_no + 1))?;

        let timestamp: f64 = match time_text.trim().parse() {
            Ok(t) => t,
            // Tolerate a header row.
            Err(_) if line_no == 0 => continue,
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("line {}: bad timestamp {:?}", line_no + 1, time_text))
            }
        };
        readings.push(RawReading::new(timestamp, value_text.trim()));
    }

    Ok(ScriptedSource::new(readings))
}
