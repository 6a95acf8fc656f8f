use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::catalog::Domain;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "relogic")]
#[command(about = "Analyze and rewrite protective-relay control logic equations")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without writing files
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report per-category usage, capacity and free slots
    Usage(UsageArgs),

    /// List every line with its logic-cost metric
    Lines(LinesArgs),

    /// Apply a set of simultaneous token renames
    Rename(RenameArgs),

    /// Move instances between the protection and automation pools
    ChangeDomain(ChangeDomainArgs),

    /// Convert conditioning timers (PCT) into sequencing timers (PST)
    ConvertTimers(ConvertTimersArgs),

    /// Renumber a category's instances onto fresh slots from a floor
    Reorder(ReorderArgs),

    /// Initialize a relogic.toml config file
    Init(InitArgs),
}

#[derive(Args)]
pub struct UsageArgs {
    /// Logic text file (use '-' for stdin)
    pub input: PathBuf,

    /// Emit the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Include the residual-token listing
    #[arg(long)]
    pub residuals: bool,
}

#[derive(Args)]
pub struct LinesArgs {
    /// Logic text file (use '-' for stdin)
    pub input: PathBuf,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Logic text file (use '-' for stdin)
    pub input: PathBuf,

    /// Rename pair OLD=NEW; repeatable, all pairs apply in one pass
    #[arg(long = "map", value_name = "OLD=NEW", required = true)]
    pub maps: Vec<String>,

    /// Write the rewritten document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ChangeDomainArgs {
    /// Logic text file (use '-' for stdin)
    pub input: PathBuf,

    /// Instance (PLT13), range (PLT4-9) or whole category (PLT)
    pub selector: String,

    /// Destination domain
    #[arg(long, value_enum)]
    pub to: DomainArg,

    /// Write the rewritten document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DomainArg {
    Protection,
    Automation,
}

impl From<DomainArg> for Domain {
    fn from(d: DomainArg) -> Self {
        match d {
            DomainArg::Protection => Domain::Protection,
            DomainArg::Automation => Domain::Automation,
        }
    }
}

#[derive(Args)]
pub struct ConvertTimersArgs {
    /// Logic text file (use '-' for stdin)
    pub input: PathBuf,

    /// Instance (PCT5), range (PCT1-8) or whole category (PCT)
    pub selector: String,

    /// Override the configured nominal system frequency (Hz)
    #[arg(long)]
    pub frequency: Option<f64>,

    /// Lowest destination timer number to allocate
    #[arg(long)]
    pub floor: Option<u16>,

    /// Write the rewritten document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Logic text file (use '-' for stdin)
    pub input: PathBuf,

    /// Category to renumber (e.g. PSV)
    pub category: String,

    /// Lowest destination number
    #[arg(long, default_value = "1")]
    pub floor: u16,

    /// Write the rewritten document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to create the config file in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}
