use clap::Parser;
use reportpub::cli::commands;
use reportpub::cli::{Cli, Commands};
use reportpub::config;
use reportpub::logging::init_logging;
use reportpub::{PublishError, StructuredError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_json) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);

    let result = match &cli.command {
        Commands::Timestamp(args) => commands::timestamp::execute(args, cli.json, &overrides),
        Commands::Run(args) => commands::run::execute(args, cli.json, &overrides),
        Commands::Extract => commands::extract::execute(cli.json, &overrides),
        Commands::Publish(args) => commands::publish::execute(args, cli.json, &overrides),
        Commands::Notify(args) => commands::notify::execute(args, cli.json, &overrides),
        Commands::Pipeline(args) => commands::pipeline::execute(args, cli.json, &overrides),
        Commands::List(args) => commands::list::execute(args, cli.json, &overrides),
        Commands::Schema(args) => commands::schema::execute(args),
        Commands::Config(args) => commands::config::execute(args, cli.json, &overrides),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Version => commands::version::execute(cli.json),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &PublishError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        root: cli.root.clone(),
        config: cli.config.clone(),
        artifacts_dir: cli.artifacts_dir.clone(),
        no_color: cli.no_color,
        ..Default::default()
    }
}
