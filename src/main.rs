//! secscan CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use secscan_engine::cli::{Cli, Commands};
use secscan_engine::commands::{run_analyze, run_dump_tree, run_rules, CommandContext};
use secscan_engine::config::SecscanConfig;
use secscan_engine::error::{Result, FINDINGS_EXIT_CODE};

fn main() -> ExitCode {
    match run() {
        Ok((output, code)) => {
            print!("{}", output);
            code
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> Result<(String, ExitCode)> {
    let cli = Cli::parse();
    let config = SecscanConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging.level, cli.verbose);

    let ctx = CommandContext::new(cli.format, cli.verbose, config);

    match &cli.command {
        Commands::Analyze(args) => {
            let outcome = run_analyze(args, &ctx)?;
            let code = if outcome.threshold_reached {
                ExitCode::from(FINDINGS_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
            Ok((outcome.output, code))
        }
        Commands::Rules(args) => Ok((with_newline(run_rules(args, &ctx)?), ExitCode::SUCCESS)),
        Commands::DumpTree(args) => Ok((with_newline(run_dump_tree(args, &ctx)?), ExitCode::SUCCESS)),
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the configured level
fn init_logging(level: &str, verbose: bool) {
    let default_level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("secscan_engine={}", default_level)))
        .unwrap_or_else(|_| EnvFilter::new("secscan_engine=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn with_newline(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
