#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{build_tree, check, claim, countdown, prove, session};

#[derive(Parser, Debug)]
#[command(name = "airdrop-claim")]
#[command(about = "Airdrop eligibility and claim tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    BuildTree(build_tree::Cli),
    Check(check::Cli),
    Claim(claim::Cli),
    Countdown(countdown::Cli),
    Prove(prove::Cli),
    Session(session::Cli),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(args)?,
        Commands::Check(args) => check::run(args).await?,
        Commands::Claim(args) => claim::run(args).await?,
        Commands::Countdown(args) => countdown::run(args).await?,
        Commands::Prove(args) => prove::run(args).await?,
        Commands::Session(args) => session::run(args).await?,
    }

    Ok(())
}
