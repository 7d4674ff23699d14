use crate::allowlist::{AllowList, AllowListEntry};
use crate::common::{entry_leaf, hash_pair, parse_address};
use alloy::primitives::B256;
use anyhow::Context;
use std::future::Future;

/// Produces the membership proof the airdrop contract checks for a claimer.
pub trait ProofSource: Send + Sync + 'static {
    fn proof_for(
        &self,
        entry: &AllowListEntry,
    ) -> impl Future<Output = anyhow::Result<Vec<B256>>> + Send;
}

/// Keccak merkle tree over sorted allow-list leaves with sorted-pair hashing.
///
/// An odd node at the end of a level is carried up unchanged.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<B256>>,
}

impl MerkleTree {
    pub fn from_allow_list(list: &AllowList) -> anyhow::Result<Self> {
        let leaves = list
            .entries()
            .iter()
            .map(|entry| {
                let address = parse_address(&entry.address)
                    .with_context(|| format!("Invalid allow-list address {}", entry.address))?;
                Ok(entry_leaf(&address, entry.max_claimable.units()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::from_leaves(leaves))
    }

    pub fn from_leaves(mut leaves: Vec<B256>) -> Self {
        leaves.sort();
        let mut levels = vec![leaves];

        while levels.last().is_some_and(|level| level.len() > 1) {
            let next_level = levels
                .last()
                .map(|level| {
                    level
                        .chunks(2)
                        .map(|chunk| match chunk {
                            [left, right] => hash_pair(*left, *right),
                            _ => chunk[0],
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            levels.push(next_level);
        }

        Self { levels }
    }

    /// Root of the tree, zero for an empty allow-list.
    pub fn root(&self) -> B256 {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(B256::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Collects the sibling hashes from `leaf` up to the root.
    pub fn proof(&self, leaf: B256) -> anyhow::Result<Vec<B256>> {
        let leaves = self
            .levels
            .first()
            .context("Merkle tree is empty")?;
        let mut current_index = leaves
            .binary_search(&leaf)
            .map_err(|_| anyhow::anyhow!("Leaf {} is not part of the tree", leaf))?;

        let mut proof = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = current_index ^ 1;
            if let Some(sibling) = level.get(sibling_index) {
                proof.push(*sibling);
            }
            current_index /= 2;
        }

        Ok(proof)
    }

    pub fn verify(proof: &[B256], root: B256, leaf: B256) -> bool {
        proof.iter().fold(leaf, |hash, node| hash_pair(hash, *node)) == root
    }
}

impl ProofSource for MerkleTree {
    async fn proof_for(&self, entry: &AllowListEntry) -> anyhow::Result<Vec<B256>> {
        let address = parse_address(&entry.address)?;
        self.proof(entry_leaf(&address, entry.max_claimable.units()))
    }
}
