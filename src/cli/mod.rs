use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod check_gateway;
mod run;
mod validate;

#[derive(Parser)]
#[command(
    name = "pongo",
    version,
    about = "Kong plugin validator and test runner"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log filter (e.g. `info`, `debug`, `pongo=trace`) [default: $RUST_LOG or info]
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Show project information
    #[arg(long)]
    about: bool,
}

/// Output format for validation results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON validation report
    Json,
}

#[derive(Subcommand)]
#[command(next_display_order = None)]
enum Commands {
    /// Validate a single plugin directory
    Validate {
        /// Path to the plugin directory [default: .]
        #[arg(name = "plugin-dir", default_value = ".")]
        plugin_dir: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Validate every plugin under the plugins directory concurrently
    Run {
        /// Config file (.json, .yaml, .yml) [default: config/config.json if present]
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory whose subdirectories are plugins (overrides config)
        #[arg(long)]
        plugins_dir: Option<PathBuf>,
        /// Where to write the JSON report (overrides config)
        #[arg(long)]
        report: Option<PathBuf>,
        /// Maximum concurrent validations (overrides config)
        #[arg(long)]
        workers: Option<usize>,
        /// Per-plugin timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Check that the configured gateway version is installed
    CheckGateway {
        /// Config file (.json, .yaml, .yml) [default: config/config.json if present]
        #[arg(long)]
        config: Option<PathBuf>,
        /// Gateway version to look for (overrides config)
        #[arg(long = "kong-version")]
        kong_version: Option<String>,
        /// Directory of installed versions (overrides config)
        #[arg(long)]
        versions_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) {
    if cli.about {
        print_about();
        return;
    }

    pongo::logging::init(cli.log_level.as_deref());

    match cli.command {
        Some(Commands::Validate { plugin_dir, format }) => validate::run(plugin_dir, format),
        Some(Commands::Run {
            config,
            plugins_dir,
            report,
            workers,
            timeout,
        }) => run::run(config, plugins_dir, report, workers, timeout),
        Some(Commands::CheckGateway {
            config,
            kong_version,
            versions_dir,
        }) => check_gateway::run(config, kong_version, versions_dir),
        None => {
            eprintln!("Usage: pongo <command> [args]");
            eprintln!("Run `pongo --help` for details.");
            std::process::exit(1);
        }
    }
}

fn print_about() {
    println!(
        "pongo: Kong Plugin Validation Tool\n\
         ├─ version:    {}\n\
         ├─ authors:    {}\n\
         ├─ source:     {}\n\
         └─ licence:    {}",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_LICENSE"),
    );
}

/// Load the config for a command, exiting with a message on failure.
fn load_config(command: &str, path: Option<&std::path::Path>) -> pongo::Config {
    pongo::Config::resolve(path).unwrap_or_else(|e| {
        eprintln!("pongo {command}: {e}");
        std::process::exit(1);
    })
}
