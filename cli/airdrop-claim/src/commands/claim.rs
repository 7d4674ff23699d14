use super::{connect, load, read_private_key};
use airdrop_claim::session::{ClaimSession, ClaimState, Effect};
use airdrop_claim::token::{register_token, WalletAssets};
use airdrop_claim::view::headline;
use airdrop_claim::Claimer;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(about = "Verify and submit an airdrop claim", long_about = None)]
pub struct Cli {
    /// Path to config JSON file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Private key (hex format, with or without 0x prefix)
    /// Alternatively, use "-" to read from stdin (more secure)
    #[arg(short = 'k', long)]
    private_key: String,

    /// Skip asking the wallet to track the token after a successful claim
    #[arg(long)]
    no_add_token: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let loaded = load(&cli.config)?;

    println!("Parsing private key...");
    let signer = read_private_key(&cli.private_key)?;
    let address = signer.address().to_string();
    println!("Claimer address: {}", address);

    let contract = Arc::new(connect(&loaded.config, Some(signer)).await?);
    let claimer = Claimer::new(loaded.allow_list.clone(), contract, loaded.tree.clone());
    let mut session = ClaimSession::new(loaded.allow_list.clone());

    for effect in session.on_address_change(Some(&address)) {
        if let Effect::Verify(ticket) = effect {
            println!("Verifying claim...");
            let outcome = claimer.verify(&ticket.address).await;
            session.apply_verification(&ticket, outcome);
        }
    }

    if session.state() != ClaimState::Claimable {
        println!("\n{}", headline(&session, &loaded.config));
        anyhow::bail!("Nothing to claim for {}", address);
    }

    println!("Submitting claim for {}...", session.max_claimable());
    let result = claimer.claim(&address).await;
    for effect in session.on_claim_result(result) {
        if let Effect::Alert(alert) = effect {
            println!("! {}", alert);
        }
    }

    println!("\n{}", headline(&session, &loaded.config));
    let tx_hash = session
        .success_hash()
        .context("Claim did not complete")?;

    if !cli.no_add_token {
        let registrar = WalletAssets::from_config(loaded.config.wallet_rpc_url.as_deref()).await?;
        if let Some(alert) = register_token(registrar.as_ref(), &loaded.config.token).await {
            println!("! {}", alert);
        }
    }

    println!("\nClaim submitted successfully!");
    println!("Transaction: {}", loaded.config.explorer_link(tx_hash));
    Ok(())
}
