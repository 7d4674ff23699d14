use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use anyhow::Context;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info};

sol! {
    #[sol(rpc)]
    contract AirdropERC20Claimable {
        function verifyClaim(address _claimer, uint256 _quantity, bytes32[] calldata _proofs, uint256 _proofMaxQuantityForWallet) public view;
        function claim(address _receiver, uint256 _quantity, bytes32[] calldata _proofs, uint256 _proofMaxQuantityForWallet) external;
    }
}

/// EIP-1193 error code a wallet returns when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Call reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl From<alloy::contract::Error> for ContractError {
    fn from(err: alloy::contract::Error) -> Self {
        if let alloy::contract::Error::TransportError(rpc) = &err {
            if let Some(payload) = rpc.as_error_resp() {
                if payload.code == USER_REJECTED_CODE {
                    return ContractError::UserRejected;
                }
                if payload.message.to_lowercase().contains("revert") {
                    return ContractError::Reverted(payload.message.to_string());
                }
            }
        }
        if err.as_revert_data().is_some() {
            return ContractError::Reverted(err.to_string());
        }
        ContractError::Rpc(err.to_string())
    }
}

/// Arguments shared by `verifyClaim` and `claim`.
///
/// The contract takes the quantity twice: once as the amount being claimed
/// and once as the ceiling committed in the merkle leaf. Both carry the
/// allow-list quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimArgs {
    pub claimer: Address,
    pub quantity: U256,
    pub proof: Vec<B256>,
    pub max_quantity: U256,
}

impl ClaimArgs {
    pub fn new(claimer: Address, quantity: U256, proof: Vec<B256>) -> Self {
        Self {
            claimer,
            quantity,
            proof,
            max_quantity: quantity,
        }
    }
}

/// Outcome of a mined claim transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub transaction_hash: TxHash,
    /// `true` for receipt status 1, `false` for status 0.
    pub success: bool,
}

pub trait ClaimContract: Send + Sync + 'static {
    /// Read-only check that the claim described by `args` is still available.
    fn verify_claim(
        &self,
        args: &ClaimArgs,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;

    /// Submits the claim and waits for its receipt.
    fn claim(
        &self,
        args: &ClaimArgs,
    ) -> impl Future<Output = Result<ClaimReceipt, ContractError>> + Send;
}

/// The deployed airdrop contract reached over JSON-RPC.
#[derive(Debug, Clone)]
pub struct AirdropContract {
    address: Address,
    provider: DynProvider,
}

impl AirdropContract {
    /// Connects to `rpc_url`, optionally signing with `signer`, and checks the
    /// endpoint serves `chain_id`.
    pub async fn connect(
        rpc_url: &str,
        chain_id: u64,
        address: Address,
        signer: Option<PrivateKeySigner>,
    ) -> anyhow::Result<Self> {
        let provider = match signer {
            Some(signer) => {
                info!(signer = %signer.address(), "Connecting with signer");
                ProviderBuilder::new()
                    .wallet(signer)
                    .connect(rpc_url)
                    .await
                    .context("Failed to connect to rpc")?
                    .erased()
            }
            None => ProviderBuilder::new()
                .connect(rpc_url)
                .await
                .context("Failed to connect to rpc")?
                .erased(),
        };

        let remote_chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to fetch chain id")?;
        if remote_chain_id != chain_id {
            anyhow::bail!(
                "RPC endpoint serves chain {} but chain {} is configured",
                remote_chain_id,
                chain_id
            );
        }

        Ok(Self { address, provider })
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl ClaimContract for AirdropContract {
    async fn verify_claim(&self, args: &ClaimArgs) -> Result<(), ContractError> {
        let airdrop = AirdropERC20Claimable::new(self.address, self.provider.clone());
        debug!(claimer = %args.claimer, "Calling verifyClaim");
        airdrop
            .verifyClaim(
                args.claimer,
                args.quantity,
                args.proof.clone(),
                args.max_quantity,
            )
            .call()
            .await
            .map(|_| ())
            .map_err(ContractError::from)
    }

    async fn claim(&self, args: &ClaimArgs) -> Result<ClaimReceipt, ContractError> {
        let airdrop = AirdropERC20Claimable::new(self.address, self.provider.clone());
        let pending_tx = airdrop
            .claim(
                args.claimer,
                args.quantity,
                args.proof.clone(),
                args.max_quantity,
            )
            .send()
            .await
            .map_err(ContractError::from)?;
        info!(tx_hash = %pending_tx.tx_hash(), "Claim submitted");

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| ContractError::Rpc(e.to_string()))?;

        Ok(ClaimReceipt {
            transaction_hash: receipt.transaction_hash(),
            success: receipt.status(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::transports::RpcError;
    use serde_json::json;

    fn rpc_failure(payload: serde_json::Value) -> alloy::contract::Error {
        let payload: ErrorPayload = serde_json::from_value(payload).unwrap();
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload))
    }

    #[test]
    fn test_user_rejection_code() {
        let err = rpc_failure(json!({"code": 4001, "message": "User rejected the request."}));
        assert_eq!(ContractError::from(err), ContractError::UserRejected);
    }

    #[test]
    fn test_execution_reverted() {
        let err = rpc_failure(json!({"code": 3, "message": "execution reverted: !Qty"}));
        assert!(matches!(
            ContractError::from(err),
            ContractError::Reverted(_)
        ));
    }

    #[test]
    fn test_other_rpc_error() {
        let err = rpc_failure(json!({"code": -32000, "message": "header not found"}));
        assert!(matches!(ContractError::from(err), ContractError::Rpc(_)));
    }

    #[test]
    fn test_claim_args_repeat_quantity() {
        let args = ClaimArgs::new(Address::repeat_byte(1), U256::from(42), vec![]);
        assert_eq!(args.quantity, args.max_quantity);
    }
}
