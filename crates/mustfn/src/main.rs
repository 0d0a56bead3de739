use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use mustfn::config::Config;
use mustfn::config::LogLevel;
use mustfn::registry;
use mustfn::report::Report;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "mustfn")]
#[command(about = "Custom XPath functions for YANG must constraints", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered function with its signature and default.
    List,

    /// Evaluate the checks in a check file.
    Eval {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Overrides the level set in the check file.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(level))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::List => {
            init_logging(LogLevel::default());
            for function in registry::functions() {
                println!("{} [default {}]", function, function.default);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Eval {
            file,
            format,
            log_level,
        } => {
            let config = Config::from_file(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            init_logging(log_level.unwrap_or(config.logging.level));
            tracing::info!("Loaded {} checks from {}", config.checks.len(), file.display());

            let tree = config.build_tree().context("building configuration tree")?;
            if tree.is_empty() {
                tracing::warn!("{} defines no tree paths", file.display());
            } else {
                tracing::debug!("Configuration tree has {} nodes", tree.len());
            }

            let report = Report::evaluate(&config.checks, &tree);
            match format {
                Format::Text => print!("{}", report.render_text()),
                Format::Json => println!("{}", report.to_json()?),
            }

            if report.passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::warn!("{} of {} checks failed", report.failures(), report.outcomes.len());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
