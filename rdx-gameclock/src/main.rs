use anyhow::Result;
use gameclock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Plays a short scripted game on every standard preset so the policies can be
/// watched side by side in the logs.
#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // 2. Load the presets, optionally extended by a preset file.
    let mut registry = ConfigRegistry::with_presets();
    if let Some(path) = std::env::args().nth(1) {
        let count = registry.merge_file(&path)?;
        info!("Loaded {} presets from {}", count, path);
    }

    // 3. Play each of them.
    for name in registry.list_config_names() {
        let preset = registry.require(name)?;
        play(preset).await?;
    }

    Ok(())
}

/// Plays a handful of turns of varying length and logs the outcome.
async fn play(preset: Preset) -> Result<()> {
    let clock = ClockEngine::from_preset(preset, Arc::new(TokioTickSource::new()?))?;
    spawn_event_listener(&clock);

    let think_times = [0u64, 300, 150, 450, 250];
    let mut player = Player::First;
    for think in think_times {
        tokio::time::sleep(Duration::from_millis(think)).await;
        clock.push(player);
        player = player.other();
    }

    clock.pause();
    let state = clock.state();
    info!(
        "[{}] moves={:?} remaining={:?} log={:?}",
        state.name.as_deref().unwrap_or("unnamed"),
        state.moves,
        state.remaining_time,
        state.log
    );
    Ok(())
}

/// Spawns a task that logs every event the clock broadcasts.
fn spawn_event_listener(clock: &ClockEngine) {
    let mut events = clock.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("[EVENT] => {:?}", event);
        }
    });
}
