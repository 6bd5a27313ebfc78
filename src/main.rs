// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS physics core command-line front end.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a request file and print the JSON report
//! qubit-os-physics analyze --input request.json
//!
//! # Read the request from stdin
//! cat request.json | qubit-os-physics analyze
//!
//! # Show effective configuration
//! qubit-os-physics config --config /path/to/physics.yaml
//! ```

use std::io::Read as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_physics::{config::Config, AnalysisRequest, PhysicsCore, Result, VERSION};

/// QubitOS Physics Core
#[derive(Parser)]
#[command(name = "qubit-os-physics")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Validated spectral, entanglement and dynamics analysis of quantum states")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a state (and optional Hamiltonian) from a JSON request
    Analyze {
        /// Request file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,

        /// Override the numerical tolerance
        #[arg(long, env = "QUBITOS_PHYSICS_TOLERANCE")]
        tolerance: Option<f64>,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() {
    if let Err(e) = run() {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Analyze {
            input,
            pretty,
            tolerance,
        } => {
            if let Some(tol) = tolerance {
                config.precision.tolerance = tol;
            }

            let core = PhysicsCore::from_config(&config)?;
            let request = read_request(input.as_deref())?;

            info!(version = VERSION, tolerance = config.precision.tolerance, "Running analysis");
            let report = core.analyze(&request)?;

            let out = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", out);
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn read_request(path: Option<&std::path::Path>) -> Result<AnalysisRequest> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&content)?)
}

/// Initialize logging with tracing. RUST_LOG takes precedence over `level`.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays a clean JSON report.
    if format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().pretty().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
