use crate::session::Alert;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use tracing::{error, info};

/// ERC-20 metadata a wallet needs to display the claimed token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

pub trait TokenRegistrar: Send + Sync + 'static {
    /// Asks the wallet to track `token`. Returns whether the wallet accepted.
    fn watch_asset(
        &self,
        token: &TokenMetadata,
    ) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

/// Registers tokens through the `wallet_watchAsset` RPC method (EIP-747).
/// This is a wallet method, so the provider must reach a wallet endpoint
/// rather than a plain node.
#[derive(Debug, Clone)]
pub struct WalletAssets {
    provider: DynProvider,
}

impl WalletAssets {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    pub async fn connect(wallet_rpc_url: &str) -> anyhow::Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(wallet_rpc_url)
            .await
            .context("Failed to connect to wallet rpc")?
            .erased();
        Ok(Self::new(provider))
    }

    /// `None` when no wallet endpoint is configured, which callers report
    /// as registration being unsupported.
    pub async fn from_config(wallet_rpc_url: Option<&str>) -> anyhow::Result<Option<Self>> {
        match wallet_rpc_url {
            Some(url) => {
                info!(url, "Connecting to wallet endpoint");
                Ok(Some(Self::connect(url).await?))
            }
            None => Ok(None),
        }
    }
}

impl TokenRegistrar for WalletAssets {
    async fn watch_asset(&self, token: &TokenMetadata) -> anyhow::Result<bool> {
        let params = json!({
            "type": "ERC20",
            "options": {
                "address": token.address,
                "symbol": token.symbol,
                "decimals": token.decimals,
            }
        });
        let accepted: bool = self
            .provider
            .raw_request("wallet_watchAsset".into(), params)
            .await?;
        Ok(accepted)
    }
}

/// Best-effort registration; any problem becomes a hint to add the token by hand.
pub async fn register_token<R: TokenRegistrar>(
    registrar: Option<&R>,
    token: &TokenMetadata,
) -> Option<Alert> {
    let Some(registrar) = registrar else {
        return Some(Alert::TokenRegistrationUnsupported);
    };
    match registrar.watch_asset(token).await {
        Ok(accepted) => {
            info!(symbol = %token.symbol, accepted, "Token registration answered");
            None
        }
        Err(e) => {
            error!("Failed to add token: {:?}", e);
            Some(Alert::TokenRegistrationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticRegistrar(Result<bool, String>);

    impl TokenRegistrar for StaticRegistrar {
        async fn watch_asset(&self, _token: &TokenMetadata) -> anyhow::Result<bool> {
            self.0.clone().map_err(anyhow::Error::msg)
        }
    }

    fn token() -> TokenMetadata {
        TokenMetadata {
            address: "0x4458B23D6e0AD0444bE4735Fac2aE9fB374C60B9".to_string(),
            symbol: "FREEBASE".to_string(),
            decimals: 18,
        }
    }

    #[tokio::test]
    async fn test_registration_accepted_or_declined() {
        assert_eq!(
            register_token(Some(&StaticRegistrar(Ok(true))), &token()).await,
            None
        );
        assert_eq!(
            register_token(Some(&StaticRegistrar(Ok(false))), &token()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_registration_failure_hints_manual_add() {
        let alert = register_token(
            Some(&StaticRegistrar(Err("method not found".to_string()))),
            &token(),
        )
        .await;
        assert_eq!(alert, Some(Alert::TokenRegistrationFailed));
    }

    #[tokio::test]
    async fn test_missing_wallet_support() {
        let alert = register_token::<StaticRegistrar>(None, &token()).await;
        assert_eq!(alert, Some(Alert::TokenRegistrationUnsupported));
        assert!(alert.unwrap().to_string().contains("manually"));
    }

    #[tokio::test]
    async fn test_no_wallet_endpoint_means_unsupported() {
        let registrar = WalletAssets::from_config(None).await.unwrap();
        assert!(registrar.is_none());
        assert_eq!(
            register_token(registrar.as_ref(), &token()).await,
            Some(Alert::TokenRegistrationUnsupported)
        );
    }

    #[test]
    fn test_token_metadata_deserialization() {
        let token: TokenMetadata = serde_json::from_str(
            r#"{"address": "0x4458B23D6e0AD0444bE4735Fac2aE9fB374C60B9", "symbol": "FREEBASE", "decimals": 18}"#,
        )
        .unwrap();
        assert_eq!(token, self::token());
    }
}
