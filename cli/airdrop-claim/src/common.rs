use alloy::primitives::{Address, B256, U256};
use anyhow::Context;
use sha3::{Digest, Keccak256};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Parses an Ethereum address from a hex string.
///
/// # Arguments
/// * `addr_str` - The address string, with or without "0x" prefix, any letter case
///
/// # Errors
/// Returns an error if the address is not 40 hex characters, contains invalid hex
/// or is the zero address
pub fn parse_address(addr_str: &str) -> anyhow::Result<Address> {
    let cleaned = addr_str
        .trim()
        .strip_prefix("0x")
        .unwrap_or(addr_str.trim());
    if cleaned.len() != 40 {
        anyhow::bail!(
            "Invalid address length: expected 40 hex chars, got {}",
            cleaned.len()
        );
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut address)
        .map_err(|e| anyhow::anyhow!("Invalid hex encoding: {}", e))?;
    if address == [0u8; 20] {
        anyhow::bail!("Zero address not allowed");
    }
    Ok(Address::from(address))
}

/// Hashes two nodes in ascending order, so the parent does not depend on
/// which side a sibling sits.
pub fn hash_pair(a: B256, b: B256) -> B256 {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let hash = Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize();
    B256::from_slice(&hash)
}

/// Computes the allow-list leaf for a claimer: keccak256 over the packed
/// 20-byte address followed by the 32-byte big-endian quantity.
pub fn entry_leaf(address: &Address, quantity: U256) -> B256 {
    let hash = Keccak256::new()
        .chain_update(address.as_slice())
        .chain_update(quantity.to_be_bytes::<32>())
        .finalize();
    B256::from_slice(&hash)
}

/// Lower-case hex with a "0x" prefix.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Writes `contents` to a sibling temp file, then renames it over `path`.
pub fn write_file_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    std::fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_with_prefix() {
        let addr = "0x1234567890abcdef1234567890abcdef12345678";
        let result = parse_address(addr).unwrap();
        assert_eq!(hex_encode(result), addr);
    }

    #[test]
    fn test_parse_address_without_prefix() {
        let addr = "1234567890abcdef1234567890abcdef12345678";
        assert!(parse_address(addr).is_ok());
    }

    #[test]
    fn test_parse_address_ignores_case() {
        let lower = parse_address("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        let upper = parse_address("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_address_invalid_length() {
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn test_parse_address_invalid_hex() {
        assert!(parse_address("0xghijklmnopqrstuvwxyz1234567890abcdefghij").is_err());
    }

    #[test]
    fn test_parse_address_zero() {
        assert!(parse_address("0x0000000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_hash_pair_is_commutative() {
        let a = B256::repeat_byte(1);
        let b = B256::repeat_byte(2);
        assert_eq!(hash_pair(a, b), hash_pair(b, a));
        assert_ne!(hash_pair(a, b), hash_pair(a, a));
    }

    #[test]
    fn test_entry_leaf_depends_on_quantity() {
        let address = Address::repeat_byte(7);
        assert_ne!(
            entry_leaf(&address, U256::from(1)),
            entry_leaf(&address, U256::from(2))
        );
        assert_eq!(
            entry_leaf(&address, U256::from(1)),
            entry_leaf(&address, U256::from(1))
        );
    }

    #[test]
    fn test_write_file_atomic() {
        let path = std::env::temp_dir().join("airdrop-claim-atomic-test.json");
        write_file_atomic(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!path.with_extension("tmp").exists());
        std::fs::remove_file(&path).unwrap();
    }
}
