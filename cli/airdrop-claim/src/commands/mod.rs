pub mod build_tree;
pub mod check;
pub mod claim;
pub mod countdown;
pub mod prove;
pub mod session;

use airdrop_claim::config::AppConfig;
use airdrop_claim::contract::AirdropContract;
use airdrop_claim::merkle::MerkleTree;
use airdrop_claim::{parse_address, AllowList};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use zeroize::Zeroize;

/// Everything a subcommand needs before touching the network.
pub struct Loaded {
    pub config: AppConfig,
    pub allow_list: Arc<AllowList>,
    pub tree: Arc<MerkleTree>,
}

pub fn load(config_path: &Path) -> Result<Loaded> {
    println!("Loading config from {:?}...", config_path);
    let config = AppConfig::load(config_path)?;

    println!("Loading allow-list from {}...", config.allow_list_path);
    let allow_list = AllowList::from_file(&config.allow_list_path, config.token.decimals)
        .context("Failed to load allow-list")?;

    let tree = MerkleTree::from_allow_list(&allow_list).context("Failed to build merkle tree")?;
    println!(
        "Allow-list: {} entries, root {}",
        allow_list.len(),
        tree.root()
    );

    Ok(Loaded {
        config,
        allow_list: Arc::new(allow_list),
        tree: Arc::new(tree),
    })
}

pub async fn connect(
    config: &AppConfig,
    signer: Option<PrivateKeySigner>,
) -> Result<AirdropContract> {
    let address = parse_address(&config.airdrop_contract_address)
        .context("Invalid airdrop contract address")?;
    println!("Connecting to {}...", config.rpc_url);
    AirdropContract::connect(&config.rpc_url, config.chain_id, address, signer).await
}

/// Reads a hex private key from the argument, or from stdin when it is "-".
pub fn read_private_key(arg: &str) -> Result<PrivateKeySigner> {
    let mut key_str = if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read private key from stdin")?;
        let trimmed = buffer.trim().to_string();
        buffer.zeroize();
        trimmed
    } else {
        arg.trim().to_string()
    };

    let decoded = hex::decode(key_str.strip_prefix("0x").unwrap_or(&key_str));
    key_str.zeroize();
    let mut key_bytes = decoded.context("Invalid private key format")?;
    if key_bytes.len() != 32 {
        let len = key_bytes.len();
        key_bytes.zeroize();
        anyhow::bail!("Invalid private key length: expected 32 bytes, got {}", len);
    }

    let signer = PrivateKeySigner::from_slice(&key_bytes).context("Invalid private key");
    key_bytes.zeroize();
    signer
}
