mod cli;
mod commands;
mod config;
mod paths;
mod request;
mod resource;
mod response;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, OutputFormat};
use request::Request;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub format: OutputFormat,
    /// `--config`, if given
    pub config_path: Option<PathBuf>,
    /// `--php` override
    pub php: Option<String>,
    /// `--occ` override
    pub occ: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the result
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        format: cli.format,
        config_path: cli.config,
        php: cli.php,
        occ: cli.occ,
    };
    log::trace!("verbosity {}, quiet {}", ctx.verbose, ctx.quiet);

    match cli.command {
        Command::App(args) => commands::run(&ctx, &Request::from(args)),
        Command::Config(args) => commands::run(&ctx, &Request::from(args)),
        Command::Setting(args) => commands::run(&ctx, &Request::from(args)),
        Command::Module { kind, params } => commands::module::run(&ctx, kind, &params),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "occctl", &mut io::stdout());
            ExitCode::SUCCESS
        }
    }
}
