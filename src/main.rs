use anyhow::Result;
use clap::Parser;
use relogic::cli::{AppContext, Cli, Commands};

fn main() -> Result<()> {
    // RUST_LOG=relogic=debug for tracing output; silent by default.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Usage(args) => relogic::usage_run(args, &ctx),
        Commands::Lines(args) => relogic::lines_run(args, &ctx),
        Commands::Rename(args) => relogic::rename_run(args, &ctx),
        Commands::ChangeDomain(args) => relogic::change_domain_run(args, &ctx),
        Commands::ConvertTimers(args) => relogic::convert_timers_run(args, &ctx),
        Commands::Reorder(args) => relogic::reorder_run(args, &ctx),
        Commands::Init(args) => relogic::infra::config::init(args, &ctx),
    }
}
