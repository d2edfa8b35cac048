mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portal-kit")]
#[command(version, about = "Site descriptor resolver for static documentation portals", long_about = None)]
struct Cli {
    /// Log stage transitions and link warnings
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Initialize new portal directory
    Init {
        /// Path to create portal directory
        path: PathBuf,
    },

    /// Validate site.toml, content and links
    Validate {
        /// Path to portal directory
        path: PathBuf,
    },

    /// Resolve the site model and route manifest
    Build {
        /// Path to portal directory
        path: PathBuf,

        /// Output directory for site-model.json and routes.json
        #[arg(short, long)]
        output: PathBuf,

        /// Locale to build (defaults to i18n.defaultLocale)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose raises the default from warn to debug
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Init { path } => commands::init::run(path),
        Command::Validate { path } => commands::validate::run(path),
        Command::Build {
            path,
            output,
            locale,
        } => commands::build::run(path, output, locale),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "portal-kit", &mut io::stdout());
            Ok(())
        }
    }
}
