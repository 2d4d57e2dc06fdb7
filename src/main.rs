use r_vidplay::config::Settings;
use r_vidplay::engine::HeadlessEngine;
use r_vidplay::files::FsFileInfoSource;
use r_vidplay::init_app_dirs;
use r_vidplay::player::{Player, PlayerCommand, PlayerOptions, PlayerUpdate};
use r_vidplay::subtitles::{FsSidecarLookup, SubtitleResolver};
use r_vidplay::ui::{format_update, parse_command, Cli, ReplCommand};
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments and initialize CLI
    let cli = Cli::new();
    let args = &cli.args;

    // Initialize application directories
    init_app_dirs()?;

    // Load configuration from file or create default
    let config_path = args.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&config_path)?;

    // Command-line arguments (and their environment variables) override the file
    if let Some(volume) = args.volume {
        settings.volume = volume;
    }
    if let Some(rate) = args.rate {
        settings.playback_rate = rate;
    }
    settings.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| settings.log_filter.as_str().into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Using configuration from {}", config_path.display());

    // The headless engine keeps playback state without rendering
    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let engine = HeadlessEngine::new(engine_tx);
    let file_info = Arc::new(FsFileInfoSource);
    let resolver = SubtitleResolver::new(
        Arc::new(FsSidecarLookup::new(settings.sidecar_search_dirs.clone())),
        file_info.clone(),
    );

    let (mut player, command_tx) = Player::new(
        Box::new(engine),
        engine_rx,
        resolver,
        file_info,
        PlayerOptions::from(&settings),
    );
    let updates = player.subscribe_state_updates();
    let player_handle = tokio::spawn(async move { player.run().await });
    let printer_handle = tokio::spawn(print_updates(updates));

    let (videos, subtitles) = cli.initial_locators();
    if !videos.is_empty() {
        command_tx.send(PlayerCommand::OpenFiles { locators: videos }).await?;
        if !subtitles.is_empty() {
            command_tx.send(PlayerCommand::AddSubtitles { locators: subtitles }).await?;
        }
        if !args.no_autoplay {
            command_tx.send(PlayerCommand::Play).await?;
        }
    }

    cli.display_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        if let Some(player_command) = command.to_player_command() {
            command_tx.send(player_command).await?;
            continue;
        }
        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => cli.display_help(),
            ReplCommand::List => {
                let (tx, rx) = oneshot::channel();
                command_tx.send(PlayerCommand::GetFullState(tx)).await?;
                let snapshot = rx.await?;
                cli.display_playlist(&snapshot.items, snapshot.current_index);
            }
            ReplCommand::Tracks => {
                let (tx, rx) = oneshot::channel();
                command_tx.send(PlayerCommand::GetFullState(tx)).await?;
                cli.display_tracks(&rx.await?.tracks);
            }
            ReplCommand::State => {
                let (tx, rx) = oneshot::channel();
                command_tx.send(PlayerCommand::GetFullState(tx)).await?;
                cli.display_snapshot(&rx.await?);
            }
            ReplCommand::CollectionShow(name) => {
                let (tx, rx) = oneshot::channel();
                command_tx.send(PlayerCommand::FilterByCollection(name.clone(), tx)).await?;
                cli.display_matches(&format!("Collection {}", name), &rx.await?);
            }
            ReplCommand::Find(text) => {
                let (tx, rx) = oneshot::channel();
                command_tx.send(PlayerCommand::FilterByText(text.clone(), tx)).await?;
                cli.display_matches(&format!("Search \"{}\"", text), &rx.await?);
            }
            other => warn!("Unhandled command: {:?}", other),
        }
    }

    command_tx.send(PlayerCommand::Shutdown).await?;
    player_handle.await?;
    printer_handle.abort();
    Ok(())
}

/// Prints player updates until the player goes away.
async fn print_updates(mut updates: broadcast::Receiver<PlayerUpdate>) {
    loop {
        match updates.recv().await {
            Ok(update) => {
                if let Some(line) = format_update(&update) {
                    println!("{}", line);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Skipped {} player updates", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
