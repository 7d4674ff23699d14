use super::load;
use airdrop_claim::merkle::ProofSource;
use airdrop_claim::{hex_encode, parse_address, write_file_atomic};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Write the merkle proof and claim arguments for an address", long_about = None)]
pub struct Cli {
    /// Path to config JSON file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Allow-listed wallet address
    #[arg(short, long)]
    address: String,

    /// Output JSON file
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProofOutput {
    merkle_root: String,
    claimer: String,
    max_claimable: String,
    quantity: String,
    proof_max_quantity_for_wallet: String,
    proofs: Vec<String>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let loaded = load(&cli.config)?;

    println!("Looking up address in allow-list...");
    let entry = loaded
        .allow_list
        .entry(&cli.address)
        .context("Address not found in allow-list")?;
    if entry.max_claimable.is_zero() {
        anyhow::bail!("Address has nothing to claim");
    }
    let claimer = parse_address(&entry.address).context("Invalid claimer address")?;

    println!("Generating merkle proof...");
    let proof = loaded
        .tree
        .proof_for(entry)
        .await
        .context("Failed to generate merkle proof")?;

    let quantity = entry.max_claimable.units().to_string();
    let output = ProofOutput {
        merkle_root: hex_encode(loaded.tree.root()),
        claimer: claimer.to_string(),
        max_claimable: entry.max_claimable.to_decimal_string()?,
        quantity: quantity.clone(),
        proof_max_quantity_for_wallet: quantity,
        proofs: proof.iter().map(hex_encode).collect(),
    };

    println!("Writing proof JSON to {:?}...", cli.output);
    let json_output = serde_json::to_string_pretty(&output).context("Failed to serialize JSON")?;
    write_file_atomic(&cli.output, &json_output).context("Failed to write proof file")?;

    println!("\nProof generated successfully!");
    println!("Claimer: {}", output.claimer);
    println!("Proof length: {} nodes", proof.len());
    Ok(())
}
