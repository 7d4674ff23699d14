use airdrop_claim::config::AppConfig;
use airdrop_claim::countdown::CountdownTimer;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Count down to the launch time", long_about = None)]
pub struct Cli {
    /// Path to config JSON file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;
    let mut timer = CountdownTimer::start(config.launch_at, Duration::from_secs(1));

    loop {
        tokio::select! {
            countdown = timer.tick() => {
                println!("{} until launch", countdown);
                if countdown.is_finished() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
