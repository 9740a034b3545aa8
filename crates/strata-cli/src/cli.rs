use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Strata: layered generative collections",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a manifest: layer weights, links and trait files
    Validate(ValidateArgs),
    /// Create items from a manifest, reveal, and report the trait distribution
    Simulate(SimulateArgs),
    /// Print the metadata document of one item
    Render(RenderArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct SimulateArgs {
    pub manifest: PathBuf,
    /// Items to create; defaults to the full capacity
    #[arg(long)]
    pub mint: Option<u64>,
    /// Items per creation batch
    #[arg(long, default_value = "1")]
    pub batch: u64,
    /// Pins every environment input, making the run reproducible
    #[arg(long, default_value = "1")]
    pub seed: u64,
}

#[derive(Args)]
pub struct RenderArgs {
    pub manifest: PathBuf,
    #[arg(long)]
    pub item: u64,
    /// Items to create before rendering; at least `item + 1`
    #[arg(long)]
    pub mint: Option<u64>,
    #[arg(long, default_value = "1")]
    pub seed: u64,
    /// Leave the collection unrevealed
    #[arg(long)]
    pub hidden: bool,
    /// Print the token URI instead of the metadata document
    #[arg(long)]
    pub uri: bool,
}
