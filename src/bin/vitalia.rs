//! VitalIA CLI - Command-line interface for the vital-signs assistant
//!
//! Commands:
//! - report: Ingest device readings and print the dashboard snapshot (batch mode)
//! - ask: Ingest device readings and answer one question
//! - run: Ingest readings and answer questions from stdin (streaming mode)
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand};
use log::warn;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vitalia::{
    ChatResponse, EngineConfig, ReadingStore, VitalError, VitalsAssistant, PRODUCER_NAME,
    SNAPSHOT_VERSION, VITALIA_VERSION,
};

/// VitalIA - vital-signs assistant
#[derive(Parser)]
#[command(name = "vitalia")]
#[command(version = VITALIA_VERSION)]
#[command(about = "Evaluate vital-sign readings and answer questions about them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest device readings and print the dashboard snapshot (batch mode)
    Report {
        /// NDJSON file of device reports (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// Pretty-print the snapshot
        #[arg(long)]
        pretty: bool,
    },

    /// Ingest device readings and answer one question
    Ask {
        /// NDJSON file of device reports (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Question to answer
        #[arg(short, long)]
        message: String,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Ingest readings and answer questions from stdin (streaming mode)
    Run {
        #[command(flatten)]
        engine: EngineArgs,

        /// Flush output after each line
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check a saved store file
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct EngineArgs {
    /// Engine configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of readings kept
    #[arg(long)]
    capacity: Option<usize>,

    /// Load a saved store before ingesting
    #[arg(long)]
    load_store: Option<PathBuf>,

    /// Save the store to file when done
    #[arg(long)]
    save_store: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), VitaliaCliError> {
    match cli.command {
        Commands::Report {
            input,
            engine,
            pretty,
        } => cmd_report(&input, &engine, pretty),
        Commands::Ask {
            input,
            message,
            engine,
        } => cmd_ask(&input, &message, &engine),
        Commands::Run { engine, flush } => cmd_run(&engine, flush),
        Commands::Doctor {
            config,
            store,
            json,
        } => cmd_doctor(config.as_deref(), store.as_deref(), json),
    }
}

fn cmd_report(input: &Path, engine: &EngineArgs, pretty: bool) -> Result<(), VitaliaCliError> {
    let assistant = build_assistant(engine)?;
    ingest_file(&assistant, input)?;

    let snapshot = assistant.snapshot();
    let output = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{}", output);

    save_store(&assistant, engine)
}

fn cmd_ask(input: &Path, message: &str, engine: &EngineArgs) -> Result<(), VitaliaCliError> {
    let assistant = build_assistant(engine)?;
    ingest_file(&assistant, input)?;

    println!("{}", assistant.reply(message));

    save_store(&assistant, engine)
}

fn cmd_run(engine: &EngineArgs, flush: bool) -> Result<(), VitaliaCliError> {
    let assistant = build_assistant(engine)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let output = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) if value.get("message").is_some() => assistant.chat_json(trimmed),
            Ok(value) if value.is_object() => assistant
                .ingest_json(trimmed)
                .and_then(|outcome| serde_json::to_string(&outcome).map_err(Into::into)),
            // Anything else is treated as a plain-text question
            _ => serde_json::to_string(&ChatResponse {
                reply: assistant.reply(trimmed),
            })
            .map_err(Into::into),
        };

        match output {
            Ok(json) => writeln!(stdout, "{}", json)?,
            Err(e) => {
                warn!("skipping line: {}", e);
                let error = CliError::from(VitaliaCliError::Engine(e));
                writeln!(stdout, "{}", serde_json::to_string(&error)?)?;
            }
        }
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    save_store(&assistant, engine)
}

fn cmd_doctor(
    config: Option<&Path>,
    store: Option<&Path>,
    json: bool,
) -> Result<(), VitaliaCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "vitalia_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("VitalIA version {}", VITALIA_VERSION),
    });

    checks.push(DoctorCheck {
        name: "snapshot_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Dashboard snapshot schema: {}", SNAPSHOT_VERSION),
    });

    if let Some(config_path) = config {
        checks.push(check_file(config_path, "config", |content| {
            let config = EngineConfig::from_json(content)?;
            Ok(format!(
                "Config valid (capacity {}, trend window {})",
                config.store_capacity, config.trend_window
            ))
        }));
    } else {
        checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "Using default configuration".to_string(),
        });
    }

    if let Some(store_path) = store {
        checks.push(check_file(store_path, "store", |content| {
            let store = ReadingStore::from_json(content)?;
            Ok(format!(
                "Store file valid ({} of {} readings)",
                store.len(),
                store.capacity()
            ))
        }));
    }

    // Check stdin is available (for streaming mode)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VITALIA_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("VitalIA Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(VitaliaCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_file(
    path: &Path,
    name: &str,
    validate: impl Fn(&str) -> Result<String, VitalError>,
) -> DoctorCheck {
    let (status, message) = if !path.exists() {
        (CheckStatus::Warning, format!("{} file does not exist", name))
    } else {
        match fs::read_to_string(path) {
            Ok(content) => match validate(&content) {
                Ok(message) => (CheckStatus::Ok, message),
                Err(e) => (CheckStatus::Error, format!("Invalid {} file: {}", name, e)),
            },
            Err(e) => (CheckStatus::Error, format!("Cannot read {} file: {}", name, e)),
        }
    };
    DoctorCheck {
        name: name.to_string(),
        status,
        message,
    }
}

fn build_assistant(engine: &EngineArgs) -> Result<VitalsAssistant, VitaliaCliError> {
    let mut config = match &engine.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(capacity) = engine.capacity {
        config.store_capacity = capacity;
    }

    let assistant = match &engine.load_store {
        Some(path) => VitalsAssistant::from_saved_store(&fs::read_to_string(path)?, config)?,
        None => VitalsAssistant::with_config(config)?,
    };
    Ok(assistant)
}

fn ingest_file(assistant: &VitalsAssistant, input: &Path) -> Result<(), VitaliaCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let mut ingested = 0;
    for (index, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        assistant
            .ingest_json(trimmed)
            .map_err(|e| VitaliaCliError::Line(index + 1, e))?;
        ingested += 1;
    }

    if ingested == 0 {
        return Err(VitaliaCliError::NoReadings);
    }
    Ok(())
}

fn save_store(assistant: &VitalsAssistant, engine: &EngineArgs) -> Result<(), VitaliaCliError> {
    if let Some(path) = &engine.save_store {
        fs::write(path, assistant.save_store()?)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum VitaliaCliError {
    Io(io::Error),
    Engine(VitalError),
    Json(serde_json::Error),
    Line(usize, VitalError),
    NoReadings,
    DoctorFailed,
}

impl From<io::Error> for VitaliaCliError {
    fn from(e: io::Error) -> Self {
        VitaliaCliError::Io(e)
    }
}

impl From<VitalError> for VitaliaCliError {
    fn from(e: VitalError) -> Self {
        VitaliaCliError::Engine(e)
    }
}

impl From<serde_json::Error> for VitaliaCliError {
    fn from(e: serde_json::Error) -> Self {
        VitaliaCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<VitaliaCliError> for CliError {
    fn from(e: VitaliaCliError) -> Self {
        match e {
            VitaliaCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            VitaliaCliError::Engine(VitalError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'vitalia doctor --config <file>' for details".to_string()),
            },
            VitaliaCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Device reports look like {\"heart_rate\": 72, \"spo2\": 91, \"temperature\": 36.5}"
                        .to_string(),
                ),
            },
            VitaliaCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            VitaliaCliError::Line(line, e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: format!("line {}: {}", line, e),
                hint: Some("Each input line must be one device report".to_string()),
            },
            VitaliaCliError::NoReadings => CliError {
                code: "NO_READINGS".to_string(),
                message: "No readings found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            VitaliaCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
