use crate::config::AppConfig;
use crate::session::{ClaimSession, ClaimState};

/// Text shown for the session's current state.
pub fn headline(session: &ClaimSession, config: &AppConfig) -> String {
    let symbol = &config.token.symbol;
    match session.state() {
        ClaimState::Disconnected => "Connect a wallet to claim your tokens.".to_string(),
        ClaimState::Ineligible => {
            "You're not eligible with this address.\nConnect a different wallet.".to_string()
        }
        ClaimState::Verifying => "Checking your claim...".to_string(),
        ClaimState::AlreadyClaimed => "You have already claimed your tokens.".to_string(),
        ClaimState::Claimable => format!(
            "You are eligible to claim {} {}.\nClaiming only requires a signature.",
            session.max_claimable(),
            symbol
        ),
        ClaimState::ClaimedSuccessfully => {
            let link = session
                .success_hash()
                .map(|tx_hash| config.explorer_link(tx_hash))
                .unwrap_or_default();
            format!(
                "You successfully claimed your tokens! {}\nAdd {} to your wallet with `add-token`.",
                link, symbol
            )
        }
    }
}
