mod decode;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use notion_core::codec::EncodeMode;
use notion_core::DecodeError;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use decode::Kind;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Notion API object toolkit.
#[derive(Parser)]
#[command(name = "notion", version, about = "Decode and validate Notion API objects")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log decoding steps to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a JSON object, validate it and print its canonical encoding
    Decode {
        /// Kind of object the input holds
        #[arg(long, value_enum)]
        kind: Kind,
        /// Accept input without the discriminator and omit it from the output
        #[arg(long)]
        exclude_type: bool,
        /// Path to the JSON file, or `-` for stdin
        input: PathBuf,
    },

    /// List every object family with its discriminator and tags
    Kinds,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("kind '{0}' has no discriminator to exclude")]
    Untagged(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl CliError {
    fn kind(&self) -> &'static str {
        match self {
            CliError::Decode(e) => e.kind(),
            CliError::Io { .. } => "io",
            CliError::Json { .. } => "json",
            CliError::Untagged(_) => "usage",
        }
    }

    fn to_json_value(&self) -> serde_json::Value {
        match self {
            CliError::Decode(e) => e.to_json_value(),
            _ => serde_json::json!({"kind": self.kind(), "message": self.to_string()}),
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decode {
            kind,
            exclude_type,
            input,
        } => {
            cmd_decode(kind, exclude_type, &input, cli.output, cli.quiet);
        }
        Commands::Kinds => {
            cmd_kinds(cli.output);
        }
    }
}

fn read_input(path: &Path) -> Result<serde_json::Value, CliError> {
    let display = path.display().to_string();
    let src = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Io {
                path: display.clone(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: display.clone(),
            source,
        })?
    };
    serde_json::from_str(&src).map_err(|source| CliError::Json {
        path: display,
        source,
    })
}

fn run_decode(kind: Kind, exclude_type: bool, input: &Path) -> Result<serde_json::Value, CliError> {
    let mode = if exclude_type {
        if !kind.supports_untagged() {
            let name = kind
                .to_possible_value()
                .map(|v| v.get_name().to_owned())
                .unwrap_or_default();
            return Err(CliError::Untagged(name));
        }
        EncodeMode::ExcludeDiscriminator
    } else {
        EncodeMode::WithDiscriminator
    };
    let tree = read_input(input)?;
    tracing::debug!(path = %input.display(), "input parsed");
    Ok(decode::canonicalize(kind, &tree, mode)?)
}

fn cmd_decode(kind: Kind, exclude_type: bool, input: &Path, output: OutputFormat, quiet: bool) {
    match run_decode(kind, exclude_type, input) {
        Ok(value) => {
            let pretty = serde_json::to_string_pretty(&value)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        Err(e) => {
            report_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

#[derive(Serialize)]
struct FamilyRow {
    name: &'static str,
    discriminator: &'static str,
    tags: Vec<&'static str>,
}

fn cmd_kinds(output: OutputFormat) {
    let rows: Vec<FamilyRow> = notion_models::catalog()
        .into_iter()
        .map(|f| FamilyRow {
            name: f.name,
            discriminator: f.discriminator,
            tags: f.tags,
        })
        .collect();
    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&rows)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for row in &rows {
                println!("{} ({}): {}", row.name, row.discriminator, row.tags.join(", "));
            }
        }
    }
}

fn report_error(err: &CliError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", err),
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&err.to_json_value())
                .unwrap_or_else(|_| format!("{{\"kind\": \"{}\"}}", err.kind()));
            eprintln!("{}", err_json);
        }
    }
}
