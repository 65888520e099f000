use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tern-cmd")]
#[command(about = "Command-line utility for tern store operations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a store file from an N-Triples document
    Build {
        /// Skip building the auxiliary orderings (smaller memory, slower
        /// predicate/object queries)
        #[arg(long)]
        no_index: bool,

        /// Source N-Triples file
        source: String,

        /// Output store path
        store_path: String,
    },

    /// Inspect a store and display summary information
    Inspect {
        /// Increase verbosity (-v lists the dictionary sections)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Store path to inspect
        store_path: String,
    },

    /// Search a store with a triple pattern
    Query {
        /// Subject term, or '?' for any
        #[arg(short, long, default_value = "?")]
        subject: String,

        /// Predicate term, or '?' for any
        #[arg(short, long, default_value = "?")]
        predicate: String,

        /// Object term, or '?' for any
        #[arg(short, long, default_value = "?")]
        object: String,

        /// Skip this many leading matches
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Print at most this many matches
        #[arg(long)]
        limit: Option<u64>,

        /// Store path to query
        store_path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            no_index,
            source,
            store_path,
        } => commands::build::run(&source, &store_path, !no_index),
        Commands::Inspect {
            verbose,
            store_path,
        } => commands::inspect::run(verbose, &store_path),
        Commands::Query {
            subject,
            predicate,
            object,
            offset,
            limit,
            store_path,
        } => commands::query::run(
            &subject,
            &predicate,
            &object,
            offset,
            limit,
            &store_path,
        ),
    }
}
