//! Claim-state machine for one wallet session.
//!
//! [`ClaimSession`] owns every piece of mutable session state: the connected
//! address, the latest verification outcome, the success hash and whether the
//! startup cue already played. Its methods are synchronous and return the
//! [`Effect`]s the front end must carry out; asynchronous work (verification,
//! claim submission) happens elsewhere and is fed back through
//! [`ClaimSession::apply_verification`] and [`ClaimSession::on_claim_result`].

use crate::allowlist::{AllowList, TokenAmount};
use alloy::primitives::TxHash;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    Disconnected,
    Ineligible,
    Verifying,
    AlreadyClaimed,
    Claimable,
    ClaimedSuccessfully,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Claimable,
    AlreadyClaimed,
    VerificationError(String),
}

impl VerificationOutcome {
    pub fn is_claimable(&self) -> bool {
        matches!(self, VerificationOutcome::Claimable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimResult {
    UserRejected,
    TransactionReverted(TxHash),
    TransactionSucceeded(TxHash),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    ClaimReverted(TxHash),
    ClaimFailed,
    TokenRegistrationUnsupported,
    TokenRegistrationFailed,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::ClaimReverted(tx_hash) => write!(
                f,
                "The claim transaction failed. Please try again later. TX Hash: {}",
                tx_hash
            ),
            Alert::ClaimFailed => f.write_str("Claiming failed. Please try again later."),
            Alert::TokenRegistrationUnsupported => f.write_str(
                "This feature may not be supported by your wallet. Please add the token manually.",
            ),
            Alert::TokenRegistrationFailed => {
                f.write_str("Failed to add token. Please add it manually.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Startup,
    Success,
}

/// Identifies one verification request. Results carrying an outdated
/// generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyTicket {
    pub generation: u64,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Verify(VerifyTicket),
    Alert(Alert),
    Cue(Cue),
}

#[derive(Debug)]
pub struct ClaimSession {
    allow_list: Arc<AllowList>,
    address: Option<String>,
    generation: u64,
    verification: Option<VerificationOutcome>,
    success_hash: Option<TxHash>,
    startup_cue_played: bool,
}

impl ClaimSession {
    pub fn new(allow_list: Arc<AllowList>) -> Self {
        Self {
            allow_list,
            address: None,
            generation: 0,
            verification: None,
            success_hash: None,
            startup_cue_played: false,
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Quantity the connected address may claim; zero when disconnected.
    pub fn max_claimable(&self) -> TokenAmount {
        match &self.address {
            Some(address) => self.allow_list.max_claimable(address),
            None => TokenAmount::zero(self.allow_list.decimals()),
        }
    }

    pub fn verification(&self) -> Option<&VerificationOutcome> {
        self.verification.as_ref()
    }

    pub fn success_hash(&self) -> Option<TxHash> {
        self.success_hash
    }

    pub fn state(&self) -> ClaimState {
        if self.address.is_none() {
            return ClaimState::Disconnected;
        }
        if self.success_hash.is_some() {
            return ClaimState::ClaimedSuccessfully;
        }
        if self.max_claimable().is_zero() {
            return ClaimState::Ineligible;
        }
        match &self.verification {
            None => ClaimState::Verifying,
            Some(outcome) if outcome.is_claimable() => ClaimState::Claimable,
            Some(_) => ClaimState::AlreadyClaimed,
        }
    }

    /// Reacts to the wallet connecting, switching or disconnecting.
    pub fn on_address_change(&mut self, address: Option<&str>) -> Vec<Effect> {
        self.generation += 1;
        self.verification = None;
        self.address = address.map(str::to_string);

        let Some(address) = address else {
            debug!("Wallet disconnected");
            self.startup_cue_played = false;
            return Vec::new();
        };

        let mut effects = Vec::new();
        if !self.startup_cue_played {
            self.startup_cue_played = true;
            effects.push(Effect::Cue(Cue::Startup));
        }

        if self.success_hash.is_some() {
            return effects;
        }

        let max_claimable = self.allow_list.max_claimable(address);
        if max_claimable.is_zero() {
            info!(address, "Address is not on the allow-list");
            return effects;
        }

        debug!(address, %max_claimable, generation = self.generation, "Requesting verification");
        effects.push(Effect::Verify(VerifyTicket {
            generation: self.generation,
            address: address.to_string(),
        }));
        effects
    }

    /// Records a verification result. Returns `false` when the ticket was
    /// superseded by a later address change and the result was dropped.
    pub fn apply_verification(
        &mut self,
        ticket: &VerifyTicket,
        outcome: VerificationOutcome,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                address = %ticket.address,
                generation = ticket.generation,
                current = self.generation,
                "Dropping stale verification result"
            );
            return false;
        }
        if let VerificationOutcome::VerificationError(reason) = &outcome {
            warn!(address = %ticket.address, %reason, "Verification failed");
        }
        self.verification = Some(outcome);
        true
    }

    pub fn on_claim_result(&mut self, result: ClaimResult) -> Vec<Effect> {
        match result {
            ClaimResult::UserRejected => {
                debug!("Claim rejected in wallet");
                Vec::new()
            }
            ClaimResult::TransactionReverted(tx_hash) => {
                warn!(%tx_hash, "Claim transaction reverted");
                vec![Effect::Alert(Alert::ClaimReverted(tx_hash))]
            }
            ClaimResult::TransactionSucceeded(tx_hash) => {
                info!(%tx_hash, "Claim succeeded");
                self.success_hash = Some(tx_hash);
                vec![Effect::Cue(Cue::Success)]
            }
            ClaimResult::Failed(reason) => {
                warn!(%reason, "Claiming error");
                vec![Effect::Alert(Alert::ClaimFailed)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::DEFAULT_DECIMALS;
    use crate::claimer::tests::init_test_logger;
    use alloy::primitives::b256;

    fn session() -> ClaimSession {
        init_test_logger();
        let list = AllowList::from_json(
            r#"[
                {"address": "0xAAA", "maxClaimable": 100},
                {"address": "0xCCC", "maxClaimable": 5},
                {"address": "0xZERO", "maxClaimable": 0}
            ]"#,
            DEFAULT_DECIMALS,
        )
        .unwrap();
        ClaimSession::new(Arc::new(list))
    }

    fn ticket(effects: &[Effect]) -> VerifyTicket {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Verify(ticket) => Some(ticket.clone()),
                _ => None,
            })
            .expect("verification requested")
    }

    fn has_verify(effects: &[Effect]) -> bool {
        effects.iter().any(|e| matches!(e, Effect::Verify(_)))
    }

    fn alerts(effects: &[Effect]) -> Vec<Alert> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Alert(alert) => Some(alert.clone()),
                _ => None,
            })
            .collect()
    }

    fn claimable_session() -> ClaimSession {
        let mut session = session();
        let effects = session.on_address_change(Some("0xAAA"));
        assert!(session.apply_verification(&ticket(&effects), VerificationOutcome::Claimable));
        session
    }

    #[test]
    fn test_starts_disconnected() {
        assert_eq!(session().state(), ClaimState::Disconnected);
    }

    #[test]
    fn test_disconnect_always_disconnected() {
        let mut session = claimable_session();
        session.on_address_change(None);
        assert_eq!(session.state(), ClaimState::Disconnected);
        assert!(session.max_claimable().is_zero());
    }

    #[test]
    fn test_unlisted_address_is_ineligible_without_verification() {
        let mut session = session();
        let effects = session.on_address_change(Some("0xBBB"));
        assert!(!has_verify(&effects));
        assert_eq!(session.state(), ClaimState::Ineligible);
    }

    #[test]
    fn test_zero_quantity_is_ineligible() {
        let mut session = session();
        let effects = session.on_address_change(Some("0xzero"));
        assert!(!has_verify(&effects));
        assert_eq!(session.state(), ClaimState::Ineligible);
    }

    #[test]
    fn test_listed_address_requests_verification() {
        let mut session = session();
        let effects = session.on_address_change(Some("0xaaa"));
        assert_eq!(ticket(&effects).address, "0xaaa");
        assert_eq!(session.state(), ClaimState::Verifying);
    }

    #[test]
    fn test_verification_outcomes() {
        let mut session = session();
        let effects = session.on_address_change(Some("0xAAA"));
        session.apply_verification(&ticket(&effects), VerificationOutcome::Claimable);
        assert_eq!(session.state(), ClaimState::Claimable);

        let effects = session.on_address_change(Some("0xAAA"));
        session.apply_verification(&ticket(&effects), VerificationOutcome::AlreadyClaimed);
        assert_eq!(session.state(), ClaimState::AlreadyClaimed);

        let effects = session.on_address_change(Some("0xAAA"));
        session.apply_verification(
            &ticket(&effects),
            VerificationOutcome::VerificationError("timeout".to_string()),
        );
        assert_eq!(session.state(), ClaimState::AlreadyClaimed);
        assert_eq!(
            session.verification(),
            Some(&VerificationOutcome::VerificationError("timeout".to_string()))
        );
    }

    #[test]
    fn test_stale_verification_is_dropped() {
        let mut session = session();
        let first = ticket(&session.on_address_change(Some("0xAAA")));
        let second = ticket(&session.on_address_change(Some("0xCCC")));

        assert!(!session.apply_verification(&first, VerificationOutcome::Claimable));
        assert_eq!(session.state(), ClaimState::Verifying);

        assert!(session.apply_verification(&second, VerificationOutcome::AlreadyClaimed));
        assert_eq!(session.state(), ClaimState::AlreadyClaimed);
        assert_eq!(session.address(), Some("0xCCC"));
    }

    #[test]
    fn test_verification_after_disconnect_is_dropped() {
        let mut session = session();
        let pending = ticket(&session.on_address_change(Some("0xAAA")));
        session.on_address_change(None);
        assert!(!session.apply_verification(&pending, VerificationOutcome::Claimable));
        assert_eq!(session.state(), ClaimState::Disconnected);
    }

    #[test]
    fn test_user_rejection_changes_nothing() {
        let mut session = claimable_session();
        let effects = session.on_claim_result(ClaimResult::UserRejected);
        assert!(effects.is_empty());
        assert_eq!(session.state(), ClaimState::Claimable);
    }

    #[test]
    fn test_revert_alerts_with_hash() {
        let mut session = claimable_session();
        let tx_hash = TxHash::repeat_byte(0xab);
        let effects = session.on_claim_result(ClaimResult::TransactionReverted(tx_hash));

        assert_eq!(session.state(), ClaimState::Claimable);
        let alerts = alerts(&effects);
        assert_eq!(alerts, vec![Alert::ClaimReverted(tx_hash)]);
        assert!(alerts[0].to_string().contains(&tx_hash.to_string()));
    }

    #[test]
    fn test_unexpected_failure_alerts_generic() {
        let mut session = claimable_session();
        let effects = session.on_claim_result(ClaimResult::Failed("nonce too low".to_string()));
        assert_eq!(alerts(&effects), vec![Alert::ClaimFailed]);
        assert_eq!(session.state(), ClaimState::Claimable);
    }

    #[test]
    fn test_success_is_sticky_for_the_session() {
        let mut session = claimable_session();
        let tx_hash = TxHash::repeat_byte(0x11);
        let effects = session.on_claim_result(ClaimResult::TransactionSucceeded(tx_hash));
        assert_eq!(effects, vec![Effect::Cue(Cue::Success)]);
        assert_eq!(session.state(), ClaimState::ClaimedSuccessfully);

        let effects = session.on_address_change(Some("0xCCC"));
        assert!(!has_verify(&effects));
        assert_eq!(session.state(), ClaimState::ClaimedSuccessfully);

        session.on_address_change(None);
        assert_eq!(session.state(), ClaimState::Disconnected);
        assert_eq!(session.success_hash(), Some(tx_hash));
    }

    #[test]
    fn test_startup_cue_once_per_connection() {
        let mut session = session();
        let effects = session.on_address_change(Some("0xBBB"));
        assert!(effects.contains(&Effect::Cue(Cue::Startup)));

        let effects = session.on_address_change(Some("0xAAA"));
        assert!(!effects.contains(&Effect::Cue(Cue::Startup)));

        session.on_address_change(None);
        let effects = session.on_address_change(Some("0xAAA"));
        assert!(effects.contains(&Effect::Cue(Cue::Startup)));
    }

    #[test]
    fn test_claim_walkthrough() {
        let mut session = session();
        assert_eq!(
            session.allow_list.max_claimable("0xaaa"),
            TokenAmount::parse("100", DEFAULT_DECIMALS).unwrap()
        );

        session.on_address_change(Some("0xBBB"));
        assert_eq!(session.state(), ClaimState::Ineligible);

        let effects = session.on_address_change(Some("0xAAA"));
        session.apply_verification(&ticket(&effects), VerificationOutcome::Claimable);
        assert_eq!(session.state(), ClaimState::Claimable);

        let tx_hash = b256!("deadbeef00000000000000000000000000000000000000000000000000000000");
        session.on_claim_result(ClaimResult::TransactionSucceeded(tx_hash));
        assert_eq!(session.state(), ClaimState::ClaimedSuccessfully);
        assert_eq!(session.success_hash(), Some(tx_hash));
        assert!(session
            .success_hash()
            .unwrap()
            .to_string()
            .starts_with("0xdeadbeef"));
    }
}
