//! Static allow-list of claimers and their claimable quantities.
//!
//! The list is read once at startup from a JSON array of
//! `{"address": "...", "maxClaimable": "100"}` records and never changes
//! afterwards. Lookups are case-insensitive on the address string; when the
//! same address appears more than once, the first record wins.

use alloy::primitives::utils::{format_units, parse_units, UnitsError};
use alloy::primitives::U256;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Decimals used by `parseEther`, the scale the allow-list quantities are written in.
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(Error, Debug)]
pub enum AllowListError {
    #[error("Failed to read allow-list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse allow-list JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid maxClaimable {value:?} for {address}: {reason}")]
    InvalidQuantity {
        address: String,
        value: String,
        reason: String,
    },
}

/// A token quantity held in base units together with the token's decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount {
    units: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn zero(decimals: u8) -> Self {
        Self {
            units: U256::ZERO,
            decimals,
        }
    }

    pub fn from_units(units: U256, decimals: u8) -> Self {
        Self { units, decimals }
    }

    /// Parses a decimal token quantity such as `"100"` or `"2.5"`.
    pub fn parse(value: &str, decimals: u8) -> Result<Self, String> {
        let value = value.trim();
        if value.starts_with('-') {
            return Err("quantity must not be negative".to_string());
        }
        let units = parse_units(value, decimals)
            .map_err(|e| e.to_string())?
            .get_absolute();
        Ok(Self { units, decimals })
    }

    pub fn units(&self) -> U256 {
        self.units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }

    /// Plain decimal form with trailing fractional zeros removed, e.g. `"1000"`.
    pub fn to_decimal_string(&self) -> Result<String, UnitsError> {
        let formatted = format_units(self.units, self.decimals)?;
        if formatted.contains('.') {
            Ok(formatted
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string())
        } else {
            Ok(formatted)
        }
    }
}

/// Groups the whole part in thousands, e.g. `1,234,567.5`.
impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.to_decimal_string().map_err(|_| fmt::Error)?;
        let (whole, fraction) = match plain.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (plain.as_str(), None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        f.write_str(&grouped)?;

        if let Some(fraction) = fraction {
            write!(f, ".{}", fraction)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowListEntry {
    pub address: String,
    pub max_claimable: TokenAmount,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    address: String,
    max_claimable: RawQuantity,
}

#[derive(Debug, Clone)]
pub struct AllowList {
    entries: Vec<AllowListEntry>,
    index: HashMap<String, usize>,
    decimals: u8,
}

impl AllowList {
    pub fn from_entries(entries: Vec<AllowListEntry>, decimals: u8) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            index
                .entry(entry.address.to_lowercase())
                .or_insert(position);
        }
        Self {
            entries,
            index,
            decimals,
        }
    }

    pub fn from_json(json: &str, decimals: u8) -> Result<Self, AllowListError> {
        let raw: Vec<RawEntry> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|raw| {
                let value = match raw.max_claimable {
                    RawQuantity::Text(text) => text,
                    RawQuantity::Number(number) => number.to_string(),
                };
                let max_claimable = TokenAmount::parse(&value, decimals).map_err(|reason| {
                    AllowListError::InvalidQuantity {
                        address: raw.address.clone(),
                        value: value.clone(),
                        reason,
                    }
                })?;
                Ok(AllowListEntry {
                    address: raw.address,
                    max_claimable,
                })
            })
            .collect::<Result<Vec<_>, AllowListError>>()?;
        Ok(Self::from_entries(entries, decimals))
    }

    pub fn from_file(path: impl AsRef<Path>, decimals: u8) -> Result<Self, AllowListError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, decimals)
    }

    /// Returns the entry recorded for `address`, ignoring letter case.
    pub fn entry(&self, address: &str) -> Option<&AllowListEntry> {
        if address.trim().is_empty() {
            return None;
        }
        self.index
            .get(&address.to_lowercase())
            .map(|&position| &self.entries[position])
    }

    /// The quantity `address` may claim, or zero when it is not listed.
    pub fn max_claimable(&self, address: &str) -> TokenAmount {
        self.entry(address)
            .map(|entry| entry.max_claimable)
            .unwrap_or_else(|| TokenAmount::zero(self.decimals))
    }

    pub fn entries(&self) -> &[AllowListEntry] {
        &self.entries
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
