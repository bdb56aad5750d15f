use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use googscope::project::analyze_project;
use googscope::report::{export_to_string, ExportFormat};

#[derive(Parser)]
#[command(name = "googscope")]
#[command(version = "0.1.0")]
#[command(about = "Static analyzer for missing and obsolete goog.require declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze Closure-style JavaScript files under a directory
    Analyze {
        /// Path to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,
    },
    /// Show version information
    Version,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Analyze { path, format }) => {
            let report = analyze_project(path)?;
            print!("{}", export_to_string(*format, &report)?);
            if report.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Some(Commands::Version) => {
            println!("googscope v{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("GoogScope - Closure namespace dependency analyzer");
            println!("Run 'googscope analyze' to check goog.require hygiene");
            println!("Run 'googscope --help' for more information");
            Ok(ExitCode::SUCCESS)
        }
    }
}
