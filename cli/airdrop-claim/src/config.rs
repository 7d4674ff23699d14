use crate::token::TokenMetadata;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONTRACT_ADDRESS_VAR: &str = "AIRDROP_CONTRACT_ADDRESS";
pub const RPC_URL_VAR: &str = "AIRDROP_RPC_URL";
pub const WALLET_RPC_URL_VAR: &str = "AIRDROP_WALLET_RPC_URL";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Wallet JSON-RPC endpoint that serves `wallet_*` methods. Token
    /// registration is skipped without one.
    #[serde(default)]
    pub wallet_rpc_url: Option<String>,
    /// Address of the deployed claimable airdrop contract.
    pub airdrop_contract_address: String,
    /// JSON allow-list, relative paths resolve against the working directory.
    pub allow_list_path: String,
    #[serde(default = "default_launch_at")]
    pub launch_at: DateTime<Utc>,
    /// Prefix a transaction hash is appended to for display.
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
    pub token: TokenMetadata,
}

fn default_launch_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 3, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn default_explorer_tx_url() -> String {
    "https://basescan.org/tx/".to_string()
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: AppConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;
        Ok(config)
    }

    /// Loads the file, then applies `.env` and process environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(address) = lookup(CONTRACT_ADDRESS_VAR).filter(|v| !v.is_empty()) {
            self.airdrop_contract_address = address;
        }
        if let Some(url) = lookup(RPC_URL_VAR).filter(|v| !v.is_empty()) {
            self.rpc_url = url;
        }
        if let Some(url) = lookup(WALLET_RPC_URL_VAR).filter(|v| !v.is_empty()) {
            self.wallet_rpc_url = Some(url);
        }
    }

    pub fn explorer_link(&self, tx_hash: impl std::fmt::Display) -> String {
        format!("{}{}", self.explorer_tx_url, tx_hash)
    }
}
