//! rxcheck: run the safety engine over JSON input from the command line.
//!
//! Usage:
//!   rxcheck prescription <request.json> [--config <file>] [--reference <file>]
//!   rxcheck interactions <medication>... [--candidate <name>]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use rxsafety::models::{PatientContext, PrescriptionRequest};
use rxsafety::{DefaultSafetyEngine, EngineConfig, ReferenceData, SafetyEngine, SafetyError};

#[derive(Parser)]
#[command(name = "rxcheck")]
#[command(version)]
#[command(about = "Validate prescriptions and check medication interactions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine config file (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reference data file (JSON); compiled-in tables when omitted
    #[arg(short, long, global = true)]
    reference: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and create a prescription from a request file
    Prescription {
        /// JSON file with `patient` and `prescription` objects
        request: PathBuf,
    },

    /// List interaction warnings for a set of medications
    Interactions {
        /// Current medications, raw names
        medications: Vec<String>,

        /// Medication being considered
        #[arg(long)]
        candidate: Option<String>,
    },
}

#[derive(Deserialize)]
struct RequestFile {
    #[serde(default)]
    patient: PatientContext,
    prescription: PrescriptionRequest,
}

fn build_engine(cli: &Cli) -> Result<DefaultSafetyEngine, SafetyError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let reference = match &cli.reference {
        Some(path) => Arc::new(ReferenceData::load(path)?),
        None => ReferenceData::builtin(),
    };
    Ok(DefaultSafetyEngine::new(config, reference))
}

fn read_request(path: &Path) -> Result<RequestFile, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("invalid request {}: {e}", path.display()))
}

fn run(cli: &Cli) -> Result<serde_json::Value, String> {
    let engine = build_engine(cli).map_err(|e| e.to_string())?;

    match &cli.command {
        Commands::Prescription { request } => {
            let file = read_request(request)?;
            let created = engine
                .create_prescription(file.prescription, &file.patient)
                .map_err(|e| e.to_string())?;
            serde_json::to_value(created).map_err(|e| e.to_string())
        }
        Commands::Interactions {
            medications,
            candidate,
        } => {
            let warnings = engine.check_interactions(medications, candidate.as_deref());
            Ok(serde_json::json!({ "warnings": warnings }))
        }
    }
}

fn main() -> ExitCode {
    rxsafety::init_logging();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(message) => {
            tracing::error!(error = %message, "rxcheck failed");
            println!("{}", serde_json::json!({ "error": message }));
            ExitCode::FAILURE
        }
    }
}
