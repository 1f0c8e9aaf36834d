//! Command line host for copy generation.
//!
//! ```bash
//! # annotate a type and print its copy method
//! cloneforge --schema types.json copy --type com.example.Person --exclude-fields "cache secret"
//!
//! # print every copy method the schema triggers
//! cloneforge --schema types.json --config cloneforge.toml generate --json
//! ```
//!
//! The `copy` command is hidden unless the loaded schema can offer it.

mod session;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use cloneforge::Error;
use session::Session;
use std::{path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(
    name = "cloneforge",
    version,
    about = "Generate copy methods for annotated types"
)]
struct Cli {
    /// JSON schema document describing the types.
    #[arg(long, env = "CLONEFORGE_SCHEMA")]
    schema: PathBuf,

    /// TOML generator configuration.
    #[arg(long, env = "CLONEFORGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

///
/// Command
///

#[derive(Debug, Subcommand)]
enum Command {
    /// Mark a type for copy generation and print the generated method.
    Copy {
        /// Type to mark, qualified or by simple name.
        #[arg(long = "type")]
        type_name: String,

        /// Space separated field names to leave out of the copy.
        #[arg(long, default_value = "")]
        exclude_fields: String,
    },

    /// Print the copy method of every marked type.
    Generate {
        /// Emit the units as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error ({}): {}", err.kind, err.message);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), Error> {
    let (schema, config) = preparse();
    let session = schema
        .map(|schema| Session::open(&schema, config.as_deref()))
        .transpose()?;
    let available = session.as_ref().is_some_and(Session::is_available);

    let matches = Cli::command()
        .mut_subcommand("copy", |copy| copy.hide(!available))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let mut session = match session {
        Some(session) => session,
        None => Session::open(&cli.schema, cli.config.as_deref())?,
    };

    match cli.command {
        Command::Copy {
            type_name,
            exclude_fields,
        } => {
            let exclude = exclude_fields.split_whitespace().map(str::to_string).collect();
            match session.copy(&type_name, &exclude)? {
                Some(content) => println!("{content}"),
                None => eprintln!("{type_name} has no fields to copy"),
            }
        }
        Command::Generate { json } => {
            let units = session.generate()?;
            if json {
                let text = serde_json::to_string_pretty(&units)
                    .map_err(|err| Error::new(cloneforge::ErrorKind::Invalid, err.to_string()))?;
                println!("{text}");
            } else {
                for unit in &units {
                    println!("// {}", unit.id);
                    if let Some(content) = &unit.content {
                        println!("{content}");
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}

// preparse
// Reads the schema and config locations before the real parse so that
// help output can reflect which commands the schema supports.
fn preparse() -> (Option<PathBuf>, Option<PathBuf>) {
    let matches = Cli::command()
        .ignore_errors(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true)
        .try_get_matches();

    match matches {
        Ok(matches) => (
            matches.get_one::<PathBuf>("schema").cloned(),
            matches.get_one::<PathBuf>("config").cloned(),
        ),
        Err(_) => (None, None),
    }
}
