use crate::allowlist::AllowList;
use crate::common::parse_address;
use crate::contract::{ClaimArgs, ClaimContract, ContractError};
use crate::merkle::ProofSource;
use crate::session::{ClaimResult, VerificationOutcome};
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Talks to the proof and contract collaborators on behalf of a session.
///
/// Cheap to clone so each verification or claim can run as its own task.
#[derive(Debug)]
pub struct Claimer<C, P> {
    allow_list: Arc<AllowList>,
    contract: Arc<C>,
    proofs: Arc<P>,
}

impl<C, P> Clone for Claimer<C, P> {
    fn clone(&self) -> Self {
        Self {
            allow_list: self.allow_list.clone(),
            contract: self.contract.clone(),
            proofs: self.proofs.clone(),
        }
    }
}

impl<C: ClaimContract, P: ProofSource> Claimer<C, P> {
    pub fn new(allow_list: Arc<AllowList>, contract: Arc<C>, proofs: Arc<P>) -> Self {
        Self {
            allow_list,
            contract,
            proofs,
        }
    }

    pub fn allow_list(&self) -> &Arc<AllowList> {
        &self.allow_list
    }

    pub fn contract(&self) -> &Arc<C> {
        &self.contract
    }

    /// Builds the contract arguments for `address` from its allow-list entry.
    pub async fn claim_args(&self, address: &str) -> anyhow::Result<ClaimArgs> {
        let entry = self
            .allow_list
            .entry(address)
            .filter(|entry| !entry.max_claimable.is_zero())
            .with_context(|| format!("{} has nothing to claim", address))?;
        let claimer = parse_address(address).context("Invalid claimer address")?;
        let proof = self
            .proofs
            .proof_for(entry)
            .await
            .context("Failed to generate merkle proof")?;
        Ok(ClaimArgs::new(claimer, entry.max_claimable.units(), proof))
    }

    /// Asks the contract whether `address` can still claim.
    pub async fn verify(&self, address: &str) -> VerificationOutcome {
        let args = match self.claim_args(address).await {
            Ok(args) => args,
            Err(e) => {
                error!(address, "Failed to prepare verification: {:?}", e);
                return VerificationOutcome::VerificationError(format!("{:#}", e));
            }
        };

        match self.contract.verify_claim(&args).await {
            Ok(()) => {
                debug!(address, "Claim is available");
                VerificationOutcome::Claimable
            }
            Err(ContractError::Reverted(reason)) => {
                info!(address, %reason, "verifyClaim reverted");
                VerificationOutcome::AlreadyClaimed
            }
            Err(e) => VerificationOutcome::VerificationError(e.to_string()),
        }
    }

    /// Submits the claim for `address` and reports how it ended.
    pub async fn claim(&self, address: &str) -> ClaimResult {
        let args = match self.claim_args(address).await {
            Ok(args) => args,
            Err(e) => {
                error!(address, "Failed to prepare claim: {:?}", e);
                return ClaimResult::Failed(format!("{:#}", e));
            }
        };

        match self.contract.claim(&args).await {
            Ok(receipt) if receipt.success => {
                ClaimResult::TransactionSucceeded(receipt.transaction_hash)
            }
            Ok(receipt) => ClaimResult::TransactionReverted(receipt.transaction_hash),
            Err(ContractError::UserRejected) => ClaimResult::UserRejected,
            Err(e) => {
                error!(address, "Claiming error: {:?}", e);
                ClaimResult::Failed(e.to_string())
            }
        }
    }
}
