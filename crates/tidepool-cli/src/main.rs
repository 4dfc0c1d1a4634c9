mod cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tidepool",
    about = "Template-driven content engine — serve and validate multi-tenant sites",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server against a template source directory
    Serve {
        /// Directory of template definitions (one subdirectory per template)
        #[arg(long, env = "TIDEPOOL_TEMPLATES")]
        templates: PathBuf,

        /// Directory of theme definitions
        #[arg(long, env = "TIDEPOOL_THEMES")]
        themes: Option<PathBuf>,

        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Don't republish definitions when the source directories change
        #[arg(long)]
        no_watch: bool,
    },

    /// Load and validate a template source without serving
    Validate {
        /// Directory of template definitions
        #[arg(long, env = "TIDEPOOL_TEMPLATES")]
        templates: PathBuf,

        /// Directory of theme definitions
        #[arg(long, env = "TIDEPOOL_THEMES")]
        themes: Option<PathBuf>,

        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve {
            templates,
            themes,
            port,
            no_watch,
        } => cmd::serve::run(templates, themes, port, !no_watch),
        Commands::Validate {
            templates,
            themes,
            json,
        } => cmd::validate::run(&templates, themes.as_deref(), json),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
