use anyhow::Result;
use c7n_core::{BuilderConfig, ClauseKind, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod script;

use commands::Workspace;

#[derive(Parser, Debug)]
#[command(name = "c7n-builder", version, about = "Cloud Custodian policy builder")]
struct Cli {
    /// Configuration file (defaults to ./c7n-builder.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Schema catalog (c7n JSON schema)
    #[arg(long, global = true, env = "C7N_SCHEMA")]
    schema: Option<PathBuf>,

    /// Documentation catalog
    #[arg(long, global = true, env = "C7N_DOCS")]
    docs: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List resource types in the catalog.
    Resources {
        /// Only labels containing this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// List the actions or filters offered for a resource type.
    Options {
        /// Resource type, e.g. aws.ec2
        resource: String,

        /// action or filter
        #[arg(long, default_value = "action")]
        kind: ClauseKind,

        /// Only labels containing this text
        #[arg(long)]
        filter: Option<String>,

        /// Include options without configurable parameters
        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Show the input form of one action or filter.
    Describe {
        /// Resource type, e.g. aws.ec2
        resource: String,

        /// action or filter
        #[arg(long, default_value = "action")]
        kind: ClauseKind,

        /// Option label or qualified name
        option: String,
    },

    /// Replay a session script and print the policy document.
    Build {
        script: PathBuf,

        /// yaml or json (defaults to output.format from the configuration)
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Interactive session on stdin.
    Shell {
        /// yaml or json (defaults to output.format from the configuration)
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = commands::load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    init_logging(&config, cli.verbose);

    let workspace = Workspace::load(config)?;
    let default_format = workspace.config.output.format;

    match cli.cmd {
        Command::Resources { filter } => commands::catalog::resources(&workspace, filter.as_deref()),
        Command::Options {
            resource,
            kind,
            filter,
            all,
        } => commands::catalog::options(&workspace, &resource, kind, filter.as_deref(), all),
        Command::Describe { resource, kind, option } => {
            commands::catalog::describe(&workspace, &resource, kind, &option)
        }
        Command::Build { script, format } => {
            commands::session::build(&workspace, &script, format.unwrap_or(default_format))
        }
        Command::Shell { format } => commands::session::shell(&workspace, format.unwrap_or(default_format)),
    }
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(config: &mut BuilderConfig, cli: &Cli) {
    if let Some(schema) = &cli.schema {
        config.catalog.schema = schema.clone();
    }
    if let Some(docs) = &cli.docs {
        config.catalog.docs = Some(docs.clone());
    }
}

/// `--verbose` forces debug; otherwise `RUST_LOG`, then `logging.level`.
/// Logs go to stderr so documents on stdout stay clean.
fn init_logging(config: &BuilderConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
