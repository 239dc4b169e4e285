// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod commands;

use bids_sidecar_core::{ExitCode, MachineError, ENV_SIDECAR_LOG_LEVEL};
use clap::{error::ErrorKind, ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const CRATE_NAME: &str = "bids-sidecar-cli";

#[derive(Parser)]
#[command(name = "bids-sidecar", version)]
#[command(about = "Generate BIDS sidecar documents from EDF headers and F11 forms")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Directory holding bids_structure.yaml and sidecar_config.yaml.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one sidecar document.
    Generate {
        #[arg(long, default_value = "eeg_json")]
        sidecar: String,
        #[arg(long)]
        edf: Option<PathBuf>,
        #[arg(long)]
        patient_id: Option<String>,
        #[arg(long)]
        session_age: Option<String>,
        #[arg(long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        forms_dir: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        fail_on_missing: bool,
        #[arg(long, default_value_t = false)]
        no_cache: bool,
    },
    /// Positional form: <output> <edf> <patient_id> <session_age>.
    EegJson {
        output: PathBuf,
        edf: PathBuf,
        patient_id: String,
        session_age: String,
        #[arg(long)]
        forms_dir: Option<PathBuf>,
    },
    /// Check an existing document against the required-field list.
    Validate {
        #[arg(long, default_value = "eeg_json")]
        sidecar: String,
        document: PathBuf,
    },
    InspectEdf {
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        channels: bool,
    },
    InspectForm {
        patient_id: String,
        #[arg(long)]
        forms_dir: Option<PathBuf>,
        #[arg(long, value_enum)]
        view: Option<FormViewCli>,
    },
    PrintConfigPaths,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormViewCli {
    EegJson,
    ParticipantsTsv,
    SessionsTsv,
}

#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
    quiet: bool,
}

#[derive(Debug)]
struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", message),
        }
    }

    fn validation(code: &str, message: &str) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            machine: MachineError::new(code, message),
        }
    }

    fn dependency(message: String) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::new("dependency_failure", &message),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::new("usage_error", "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    init_tracing(cli.verbose, cli.quiet, cli.json);
    let output = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
    };
    let config_dir = cli.config_dir;

    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;

    match command {
        Commands::Generate {
            sidecar,
            edf,
            patient_id,
            session_age,
            output: output_path,
            output_dir,
            forms_dir,
            fail_on_missing,
            no_cache,
        } => commands::generate(
            commands::GenerateArgs {
                config_dir,
                sidecar,
                edf,
                patient_id,
                session_age,
                output: output_path,
                output_dir,
                forms_dir,
                fail_on_missing,
                no_cache,
            },
            output,
        ),
        Commands::EegJson {
            output: output_path,
            edf,
            patient_id,
            session_age,
            forms_dir,
        } => commands::generate(
            commands::GenerateArgs {
                config_dir,
                sidecar: "eeg_json".to_string(),
                edf: Some(edf),
                patient_id: Some(patient_id),
                session_age: Some(session_age),
                output: Some(output_path),
                output_dir: None,
                forms_dir,
                fail_on_missing: false,
                no_cache: false,
            },
            output,
        ),
        Commands::Validate { sidecar, document } => {
            commands::validate_document(config_dir, &sidecar, &document, output)
        }
        Commands::InspectEdf { path, channels } => commands::inspect_edf(&path, channels, output),
        Commands::InspectForm {
            patient_id,
            forms_dir,
            view,
        } => {
            let view = view.map(FormViewCli::into_view);
            commands::inspect_form(&patient_id, forms_dir, view, output)
        }
        Commands::PrintConfigPaths => commands::print_config_paths(config_dir, output),
    }
}

impl FormViewCli {
    fn into_view(self) -> bids_sidecar_sources::FormView {
        match self {
            Self::EegJson => bids_sidecar_sources::FormView::EegJson,
            Self::ParticipantsTsv => bids_sidecar_sources::FormView::ParticipantsTsv,
            Self::SessionsTsv => bids_sidecar_sources::FormView::SessionsTsv,
        }
    }
}

/// Filter precedence: `BIDS_SIDECAR_LOG_LEVEL`, then `RUST_LOG`, then the
/// verbosity flags. Logs always go to stderr.
fn init_tracing(verbose: u8, quiet: bool, json: bool) {
    let fallback = default_log_level(verbose, quiet);
    let filter = EnvFilter::try_from_env(ENV_SIDECAR_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("tracing already initialized: {err}");
    }
}

/// Level used when neither environment variable sets a filter.
fn default_log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    }
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine);
        for (key, value) in &error.machine.details {
            eprintln!("  {key}: {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::default_log_level;

    #[test]
    fn verbosity_flags_select_fallback_level() {
        assert_eq!(default_log_level(0, false), "warn");
        assert_eq!(default_log_level(1, false), "info");
        assert_eq!(default_log_level(2, false), "debug");
        assert_eq!(default_log_level(3, false), "trace");
        assert_eq!(default_log_level(7, false), "trace");
        assert_eq!(default_log_level(2, true), "error");
    }
}
