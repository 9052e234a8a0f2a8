//! Actionmap CLI - Command-line interface for the actionmap mapping engine
//!
//! This is the main entry point for the actionmap CLI application, providing
//! commands for transforming payloads with directive mappings, evaluating
//! field maps, listing referenced keys and validating mappings.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Initialize logging
    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
fn run(cli: Cli) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    // Completions never need configuration
    if let Commands::Completions(args) = cli.command {
        return handlers::handle_completions(args);
    }

    let config = {
        let _config_timer = Timer::new("config_loading");
        tracing::info!("Loading configuration");
        Config::load_with_file(cli.config.as_deref())?
    };

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);

    let mut output = OutputWriter::new(
        handlers::effective_format(cli.output, &config),
        use_color,
        cli.quiet,
        cli.verbosity_level(),
    );

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Transform(args) => handlers::handle_transform(args, &config, &mut output),
        Commands::Evaluate(args) => handlers::handle_evaluate(args, &config, &mut output),
        Commands::Keys(args) => handlers::handle_keys(args, &config, &mut output),
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["actionmap", "-vv", "validate", "mapping.json"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["actionmap", "--quiet", "validate", "mapping.json"]);
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::parse_from(["actionmap", "keys", "mapping.json", "--unique"]);
        assert!(matches!(cli.command, Commands::Keys(ref args) if args.unique && !args.field_map));
    }
}
