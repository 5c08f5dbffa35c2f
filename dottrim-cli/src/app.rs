use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dottrim - trace-driven trimming of .NET assembly images
#[derive(Debug, Parser)]
#[command(name = "dottrim", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display image overview: identity, streams, table row counts, heaps.
    Info {
        /// Path to the .NET assembly file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Zero unreachable metadata and IL, guided by an invocation trace.
    Trim {
        /// Path to the .NET assembly file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Invocation statistics document (JSON).
        #[arg(short, long, value_name = "JSON")]
        stats: PathBuf,

        /// Assembly name to select from the statistics document.
        #[arg(short, long, value_name = "NAME")]
        assembly: String,

        /// Trim individual methods on preserved types (S1) instead of
        /// whole types only (S0).
        #[arg(long)]
        method_level: bool,

        /// Also run the deep reference-closure trim over auxiliary tables
        /// and heaps.
        #[arg(long)]
        deep: bool,

        /// Output path. Defaults to the input path with a `.s0`/`.s1`
        /// suffix, plus `.d` when --deep is set.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}
