//! kubechart CLI - kustomize-built operator manifests to Helm chart templates

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "kubechart")]
#[command(author = "kubechart Contributors")]
#[command(version)]
#[command(about = "Turn kustomize-built operator manifests into Helm chart templates", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Template a multi-document manifest stream
    Template {
        /// Manifest file, or - for stdin
        input: PathBuf,

        /// Kubebuilder project name (overrides the config file)
        #[arg(short, long, env = "KUBECHART_PROJECT_NAME")]
        project_name: Option<String>,

        /// Templater config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Chart directory to write templates/ into (if not set, outputs to stdout)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Template {
            input,
            project_name,
            config,
            output_dir,
        } => commands::template::run(
            &input,
            project_name.as_deref(),
            config.as_deref(),
            output_dir.as_deref(),
        ),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(report) = run(cli) {
        eprintln!("{report:?}");
        std::process::exit(error::exit_code_for(&report));
    }
}
