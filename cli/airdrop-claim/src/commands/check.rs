use super::{connect, load};
use airdrop_claim::session::{ClaimSession, Effect};
use airdrop_claim::view::headline;
use airdrop_claim::Claimer;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(about = "Check whether an address can claim", long_about = None)]
pub struct Cli {
    /// Path to config JSON file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Wallet address to check
    #[arg(short, long)]
    address: String,
}

pub async fn run(cli: Cli) -> Result<()> {
    let loaded = load(&cli.config)?;
    let mut session = ClaimSession::new(loaded.allow_list.clone());

    println!("Max claimable: {}", loaded.allow_list.max_claimable(&cli.address));

    for effect in session.on_address_change(Some(&cli.address)) {
        if let Effect::Verify(ticket) = effect {
            let contract = connect(&loaded.config, None).await?;
            let claimer = Claimer::new(
                loaded.allow_list.clone(),
                Arc::new(contract),
                loaded.tree.clone(),
            );
            println!("Verifying claim...");
            let outcome = claimer.verify(&ticket.address).await;
            println!("Verification: {:?}", outcome);
            session.apply_verification(&ticket, outcome);
        }
    }

    println!("\n{}", headline(&session, &loaded.config));
    Ok(())
}
