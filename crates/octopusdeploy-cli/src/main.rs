//! terraform-provider-octopusdeploy - drive the Octopus Deploy provider from the command line

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;
mod files;
mod settings;

use commands::Session;
use error::Result;
use settings::{ConnectionArgs, Settings};

/// Environment variable holding the log filter
const ENV_TF_LOG: &str = "TF_LOG";

#[derive(Parser)]
#[command(name = "terraform-provider-octopusdeploy")]
#[command(version)]
#[command(about = "Manage Octopus Deploy resources through the Terraform provider", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Settings file (YAML); defaults to the user's config directory
    #[arg(long = "config", global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print schemas as JSON
    Schema {
        /// Only this resource type or data source
        type_name: Option<String>,
    },

    /// Validate a resource configuration
    Validate {
        /// Resource type, e.g. octopusdeploy_environment
        type_name: String,

        /// Configuration file (JSON or YAML)
        config: PathBuf,
    },

    /// Show the changes applying a configuration would make
    Plan {
        type_name: String,

        config: PathBuf,

        /// State file of an existing resource
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// Create, update or replace a resource
    Apply {
        type_name: String,

        config: PathBuf,

        /// State file of an existing resource; rewritten after apply
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Write the new state here instead of the state file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Re-read a resource and update its state file
    Refresh {
        type_name: String,

        #[arg(short, long)]
        state: PathBuf,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete a resource and its state file
    Destroy {
        type_name: String,

        #[arg(short, long)]
        state: PathBuf,
    },

    /// Import an existing object by ID
    Import {
        type_name: String,

        /// Octopus Deploy ID of the object
        id: String,

        /// State file to write; printed when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Read a data source
    Query {
        /// Data source, e.g. octopusdeploy_environments
        type_name: String,

        /// Search parameters (JSON or YAML)
        config: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(ENV_TF_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli.settings.as_deref())?.merge(&cli.connection);
    let session = Session::new(settings);

    match cli.command {
        Commands::Schema { type_name } => commands::schema::run(&session, type_name.as_deref()),

        Commands::Validate { type_name, config } => {
            commands::validate::run(&session, &type_name, &config).await
        }

        Commands::Plan {
            type_name,
            config,
            state,
        } => commands::plan::run(&session, &type_name, &config, state.as_deref()).await,

        Commands::Apply {
            type_name,
            config,
            state,
            out,
        } => {
            commands::apply::run(&session, &type_name, &config, state.as_deref(), out.as_deref()).await
        }

        Commands::Refresh {
            type_name,
            state,
            out,
        } => commands::refresh::run(&session, &type_name, &state, out.as_deref()).await,

        Commands::Destroy { type_name, state } => {
            commands::destroy::run(&session, &type_name, &state).await
        }

        Commands::Import { type_name, id, out } => {
            commands::import::run(&session, &type_name, &id, out.as_deref()).await
        }

        Commands::Query { type_name, config } => {
            commands::query::run(&session, &type_name, config.as_deref()).await
        }
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
