use super::{connect, load, read_private_key};
use airdrop_claim::app::{run_session, spawn_stdin_wallet, TerminalPresenter};
use airdrop_claim::token::WalletAssets;
use airdrop_claim::Claimer;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(about = "Interactive claim session driven from stdin", long_about = None)]
pub struct Cli {
    /// Path to config JSON file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Private key used to sign claims, "-" reads it from stdin.
    /// Without it the session can only check eligibility.
    #[arg(short = 'k', long)]
    private_key: Option<String>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let loaded = load(&cli.config)?;

    let signer = cli
        .private_key
        .as_deref()
        .map(read_private_key)
        .transpose()?;
    let default_address = signer.as_ref().map(|signer| signer.address().to_string());

    let contract = Arc::new(connect(&loaded.config, signer).await?);
    let registrar = WalletAssets::from_config(loaded.config.wallet_rpc_url.as_deref())
        .await?
        .map(Arc::new);
    let claimer = Claimer::new(loaded.allow_list.clone(), contract, loaded.tree.clone());

    println!("Commands: connect [address] | disconnect | claim | add-token | quit");
    let events = spawn_stdin_wallet(default_address.clone());
    let mut presenter = TerminalPresenter;
    let session = run_session(
        &loaded.config,
        claimer,
        registrar,
        default_address,
        events,
        &mut presenter,
    )
    .await;

    if let Some(tx_hash) = session.success_hash() {
        println!("Claimed in {}", loaded.config.explorer_link(tx_hash));
    }
    Ok(())
}
