pub mod allowlist;
pub mod app;
pub mod claimer;
pub mod common;
pub mod config;
pub mod contract;
pub mod countdown;
pub mod merkle;
pub mod session;
pub mod token;
pub mod view;

pub use allowlist::{AllowList, AllowListEntry, TokenAmount};
pub use claimer::Claimer;
pub use common::{entry_leaf, hash_pair, hex_encode, parse_address, write_file_atomic};
pub use session::{Alert, ClaimResult, ClaimSession, ClaimState, Cue, Effect, VerificationOutcome};
