mod app;
mod commands;
mod stats;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    let level = if cli.global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("dottrim", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    match &cli.command {
        Command::Info { path } => commands::info::run(path),
        Command::Trim {
            path,
            stats,
            assembly,
            method_level,
            deep,
            output,
        } => commands::trim::run(
            path,
            &commands::trim::TrimOptions {
                stats,
                assembly,
                method_level: *method_level,
                deep: *deep,
                output: output.as_deref(),
            },
        ),
    }
}
