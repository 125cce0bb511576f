use anyhow::Context;
use std::sync::Arc;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use werewolf_client::{
    backend::BackendClient,
    models::{ClientConfig, Command, Opt},
    services::Game,
    utils::ConsolePresenter,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let opt = Opt::from_args();

    let default_filter = if opt.verbose {
        "info,werewolf_client=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env().with_overrides(&opt);
    info!(base_url = %config.base_url, prefetch = config.prefetch, "config loaded");

    let client = BackendClient::new(&config.base_url, config.request_timeout)
        .context("failed to build HTTP client")?
        .with_prefetch(config.prefetch);

    match opt.command.unwrap_or(Command::Play) {
        Command::Play => {
            let console = Arc::new(ConsolePresenter::new(config.typewriter_delay));
            let mut game = Game::start(client, console.clone(), console.clone(), console.clone())
                .await
                .context("failed to start game")?;
            let winner = game.run().await.context("game halted")?;
            println!("{}", winner);
            for line in console.transcript() {
                println!("{}", line);
            }
        }
        Command::History => {
            let history = client.history().await.context("failed to load history")?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Command::TtsStatus => {
            let status = client.tts_status().await.context("failed to query TTS")?;
            println!(
                "available: {}{}",
                status.available,
                if status.message.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", status.message)
                }
            );
        }
    }

    Ok(())
}
