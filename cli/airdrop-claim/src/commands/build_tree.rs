use airdrop_claim::allowlist::DEFAULT_DECIMALS;
use airdrop_claim::merkle::MerkleTree;
use airdrop_claim::{hex_encode, write_file_atomic, AllowList};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Build the merkle root from an allow-list", long_about = None)]
pub struct Cli {
    /// Input allow-list JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Decimals the maxClaimable quantities are scaled by
    #[arg(short, long, default_value_t = DEFAULT_DECIMALS)]
    decimals: u8,

    /// Output file for Merkle root
    #[arg(short, long)]
    root_output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Reading allow-list from {:?}...", cli.input);
    let allow_list =
        AllowList::from_file(&cli.input, cli.decimals).context("Failed to load allow-list")?;
    println!("Total entries: {}", allow_list.len());

    println!("Building Merkle tree...");
    let tree = MerkleTree::from_allow_list(&allow_list)?;
    let root = hex_encode(tree.root());
    println!("Merkle root: {}", root);
    println!("Tree depth: {}", tree.depth());

    if let Some(root_path) = cli.root_output {
        println!("Writing Merkle root to {:?}...", root_path);
        write_file_atomic(&root_path, &format!("{}\n", root)).context("Failed to write root")?;
    }

    println!("Done!");
    Ok(())
}
