//! Compara CLI - Main entry point

use compara_cli::commands::search::GeneSource;
use compara_cli::{Cli, Commands, Config};
use compara_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

fn main() {
    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    // Verbose runs show debug events; otherwise only warnings reach stderr
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("compara")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI keeps working if a subscriber cannot be installed
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
fn execute_command(cli: &Cli) -> compara_cli::Result<()> {
    let Some(ref command) = cli.command else {
        return Err(compara_cli::CliError::config("A subcommand is required"));
    };

    let config = Config::from_env()?;

    match command {
        Commands::Search {
            input,
            genes,
            gene,
            species,
            output,
            progress_interval,
        } => {
            let config = config.with_overrides(output.clone(), species.clone(), *progress_interval);
            let source = GeneSource {
                file: genes.clone(),
                names: gene.clone(),
            };
            compara_cli::commands::search::run(input.clone(), source, &config, cli.format)
        },

        Commands::Split { input, output } => {
            let config = config.with_overrides(output.clone(), None, None);
            compara_cli::commands::split::run(input.clone(), &config, cli.format)
        },

        Commands::CountNodes { input, output } => {
            compara_cli::commands::count_nodes::run(input.clone(), output.clone(), cli.format)
        },

        Commands::Homology {
            input,
            output,
            species,
            identity,
        } => {
            let config = config.with_overrides(output.clone(), None, None);
            compara_cli::commands::homology::run(
                input.clone(),
                species.clone(),
                *identity,
                &config,
                cli.format,
            )
        },

        Commands::Variants {
            input,
            output,
            exclude,
            keep_all,
        } => {
            let exclude = (!*keep_all).then(|| exclude.clone());
            compara_cli::commands::variants::run(input.clone(), output.clone(), exclude, cli.format)
        },
    }
}
