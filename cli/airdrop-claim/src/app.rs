use crate::claimer::Claimer;
use crate::config::AppConfig;
use crate::contract::ClaimContract;
use crate::countdown::{Countdown, CountdownTimer};
use crate::merkle::ProofSource;
use crate::session::{
    Alert, ClaimResult, ClaimSession, ClaimState, Cue, Effect, VerificationOutcome, VerifyTicket,
};
use crate::token::{register_token, TokenRegistrar};
use crate::view::headline;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Notifications from the wallet side of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Connected(String),
    Disconnected,
    ClaimRequested,
    AddTokenRequested,
    Quit,
}

impl WalletEvent {
    /// Parses one line of interactive input. A bare `connect` uses
    /// `default_address`, the signer's address when one is configured.
    pub fn parse(line: &str, default_address: Option<&str>) -> Option<Self> {
        let mut words = line.split_whitespace();
        let event = match words.next()? {
            "connect" => WalletEvent::Connected(
                words
                    .next()
                    .or(default_address)
                    .map(str::to_string)?,
            ),
            "disconnect" => WalletEvent::Disconnected,
            "claim" => WalletEvent::ClaimRequested,
            "add-token" => WalletEvent::AddTokenRequested,
            "quit" | "exit" => WalletEvent::Quit,
            _ => return None,
        };
        Some(event)
    }
}

/// Forwards stdin lines as wallet events until input ends.
pub fn spawn_stdin_wallet(default_address: Option<String>) -> mpsc::Receiver<WalletEvent> {
    let (sender, receiver) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read stdin: {:?}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match WalletEvent::parse(&line, default_address.as_deref()) {
                Some(event) => {
                    if sender.send(event).await.is_err() {
                        break;
                    }
                }
                None => warn!(
                    input = %line.trim(),
                    "Unknown command, expected connect [address] | disconnect | claim | add-token | quit"
                ),
            }
        }
    });
    receiver
}

/// Where the session loop sends everything the user should see or hear.
pub trait Presenter {
    fn show(&mut self, text: &str);
    fn alert(&mut self, alert: &Alert);
    fn cue(&mut self, cue: Cue);
    fn countdown(&mut self, countdown: &Countdown);
}

/// Prints to the terminal; cues ring the bell.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn show(&mut self, text: &str) {
        println!("{}", text);
    }

    fn alert(&mut self, alert: &Alert) {
        println!("! {}", alert);
    }

    fn cue(&mut self, cue: Cue) {
        info!(?cue, "Playing cue");
        print!("\x07");
    }

    fn countdown(&mut self, countdown: &Countdown) {
        println!("{} until launch", countdown);
    }
}

enum TaskOutput {
    Verified(VerifyTicket, VerificationOutcome),
    Claimed(ClaimResult),
    TokenRegistered(Option<Alert>),
}

async fn next_tick(timer: &mut Option<CountdownTimer>) -> Countdown {
    match timer {
        Some(timer) => timer.tick().await,
        None => std::future::pending().await,
    }
}

/// Drives a claim session until `Quit`, or until the event stream closes
/// and every outstanding task has resolved. Returns the final session.
///
/// `signer` is the address of the key that signs claim transactions. Claims
/// are only submitted while that address is the connected one.
pub async fn run_session<C, P, R, V>(
    config: &AppConfig,
    claimer: Claimer<C, P>,
    registrar: Option<Arc<R>>,
    signer: Option<String>,
    mut events: mpsc::Receiver<WalletEvent>,
    presenter: &mut V,
) -> ClaimSession
where
    C: ClaimContract,
    P: ProofSource,
    R: TokenRegistrar,
    V: Presenter,
{
    let mut session = ClaimSession::new(claimer.allow_list().clone());
    let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
    let mut timer = Some(CountdownTimer::start(config.launch_at, Duration::from_secs(1)));
    let mut events_open = true;
    let mut claim_in_flight = false;

    presenter.show(&headline(&session, config));

    loop {
        tokio::select! {
            event = events.recv(), if events_open => match event {
                Some(WalletEvent::Quit) => break,
                Some(WalletEvent::Connected(address)) => {
                    let effects = session.on_address_change(Some(&address));
                    apply_effects(effects, &claimer, &mut tasks, presenter);
                    presenter.show(&headline(&session, config));
                }
                Some(WalletEvent::Disconnected) => {
                    let effects = session.on_address_change(None);
                    apply_effects(effects, &claimer, &mut tasks, presenter);
                    presenter.show(&headline(&session, config));
                }
                Some(WalletEvent::ClaimRequested) => {
                    match (session.state(), session.address()) {
                        (ClaimState::Claimable, Some(address)) if !claim_in_flight => {
                            match signer.as_deref() {
                                Some(signer) if signer.eq_ignore_ascii_case(address) => {
                                    claim_in_flight = true;
                                    let claimer = claimer.clone();
                                    let address = address.to_string();
                                    presenter.show("Submitting claim, confirm it in your wallet...");
                                    tasks.spawn(async move {
                                        TaskOutput::Claimed(claimer.claim(&address).await)
                                    });
                                }
                                Some(signer) => {
                                    warn!(address, signer, "Connected address is not the signer");
                                    presenter.show("The connected address is not the signing wallet.");
                                }
                                None => {
                                    warn!(address, "Claim requested without a signing key");
                                    presenter.show("Load a private key to claim.");
                                }
                            }
                        }
                        (ClaimState::Claimable, _) => presenter.show("A claim is already in progress."),
                        (state, _) => {
                            debug!(?state, "Ignoring claim request");
                            presenter.show(&headline(&session, config));
                        }
                    }
                }
                Some(WalletEvent::AddTokenRequested) => {
                    let registrar = registrar.clone();
                    let token = config.token.clone();
                    tasks.spawn(async move {
                        TaskOutput::TokenRegistered(register_token(registrar.as_deref(), &token).await)
                    });
                }
                None => events_open = false,
            },
            Some(joined) = tasks.join_next() => match joined {
                Ok(TaskOutput::Verified(ticket, outcome)) => {
                    if session.apply_verification(&ticket, outcome) {
                        presenter.show(&headline(&session, config));
                    }
                }
                Ok(TaskOutput::Claimed(result)) => {
                    claim_in_flight = false;
                    let effects = session.on_claim_result(result);
                    apply_effects(effects, &claimer, &mut tasks, presenter);
                    presenter.show(&headline(&session, config));
                }
                Ok(TaskOutput::TokenRegistered(alert)) => {
                    if let Some(alert) = alert {
                        presenter.alert(&alert);
                    }
                }
                Err(e) => {
                    error!("Session task failed: {:?}", e);
                    claim_in_flight = false;
                }
            },
            countdown = next_tick(&mut timer) => {
                presenter.countdown(&countdown);
                if countdown.is_finished() {
                    timer = None;
                }
            }
        }

        if !events_open && tasks.is_empty() {
            break;
        }
    }

    tasks.shutdown().await;
    session
}

fn apply_effects<C, P, V>(
    effects: Vec<Effect>,
    claimer: &Claimer<C, P>,
    tasks: &mut JoinSet<TaskOutput>,
    presenter: &mut V,
) where
    C: ClaimContract,
    P: ProofSource,
    V: Presenter,
{
    for effect in effects {
        match effect {
            Effect::Verify(ticket) => {
                let claimer = claimer.clone();
                tasks.spawn(async move {
                    let outcome = claimer.verify(&ticket.address).await;
                    TaskOutput::Verified(ticket, outcome)
                });
            }
            Effect::Alert(alert) => presenter.alert(&alert),
            Effect::Cue(cue) => presenter.cue(cue),
        }
    }
}
