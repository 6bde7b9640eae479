//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// Yester - what happened, where, and when
///
/// Pick a year, a region and a topic; get a few illustrated historical events.
#[derive(Parser, Debug)]
#[command(name = "yester")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Keep the local cache in memory only for this run
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Skip the shared cache database
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show events for a selection (defaults to the last one used)
    Show(ShowCommand),

    /// Move through a range of years quickly, settling on the last one
    Scrub(ScrubCommand),

    /// Local and shared cache figures
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cache maintenance
    Cache(CacheCommand),

    /// Run diagnostics
    Doctor,

    /// Show version information
    Version,
}

/// Selection flags; omitted values come from the last selection.
#[derive(Args, Debug, Default, Clone)]
pub struct SelectionArgs {
    /// Year to show
    #[arg(short, long, allow_negative_numbers = true)]
    pub year: Option<i32>,

    /// Region (e.g. America, Europe, Asia)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Topic (e.g. History, Science, Culture)
    #[arg(short, long)]
    pub topic: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShowCommand {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output the settled state as JSON
    #[arg(long)]
    pub json: bool,

    /// Drop the local entry first so the selection is fetched again
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug)]
pub struct ScrubCommand {
    /// First year of the sweep
    #[arg(long, allow_negative_numbers = true)]
    pub from: i32,

    /// Year to settle on
    #[arg(long, allow_negative_numbers = true)]
    pub to: i32,

    /// Region (defaults to the last selection)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Topic (defaults to the last selection)
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Delay between consecutive years in milliseconds
    #[arg(long, default_value = "50")]
    pub interval_ms: u64,
}

#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List locally cached selections
    List,

    /// Remove every local entry
    Clear,

    /// Delete unused shared rows older than N days
    Prune {
        /// Age threshold in days
        #[arg(short, long, default_value = "30")]
        days: u32,
    },

    /// Shared rows related to a selection (same region or topic, other years)
    Similar {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Maximum rows to list
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
}
