mod cli;
mod commands;
mod config;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub cib: Option<String>,
    pub pcs: Option<String>,
    pub manifest: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
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
        cib: cli.cib,
        pcs: cli.pcs,
        manifest: cli.manifest,
    };

    match cli.command {
        Command::Status(args) => commands::status::run(&ctx, args),
        Command::Diff(args) => commands::converge::diff(&ctx, args),
        Command::Apply(args) => commands::converge::apply(&ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "pcsync", &mut io::stdout());
            Ok(())
        }
    }
}
