//! # Gameclock
//!
//! A two-player game clock engine for Rust, of the kind used for chess and
//! other turn-based games.
//!
//! Gameclock tracks each player's remaining time, enforces whose turn it is,
//! counts the running player's time down in real time, and applies one of
//! several time-control policies across one or more stages keyed by move count.
//!
//! ## Core Concepts
//!
//! - **Stages**: A time control is an ordered list of stages. Each gives both
//!   players a starting allotment and an increment, and names its policy.
//!   Later stages take over when a player reaches their configured move count.
//! - **Policies**: `Fischer` adds a fixed increment per move, `Bronstein`
//!   refunds the time spent up to the increment, `Delay` holds the clock for a
//!   grace period at the start of each turn, and `Hourglass` hands the time one
//!   player spends to the other.
//! - **Tick sources**: The engine never touches the system clock directly. A
//!   `TickSource` supplies the time and a cancellable repeating task, either
//!   backed by tokio or advanced by hand for deterministic tests.
//! - **Observation**: Every mutation and every tick produces a `ClockState`
//!   snapshot for the installed observer, and a `ClockEvent` stream reports
//!   what happened.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gameclock::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Pick a time control from the preset registry.
//!     let registry = ConfigRegistry::with_presets();
//!     let preset = registry.require("Fischer Rapid 5|5")?;
//!
//!     // 2. Create the clock, driven by the tokio runtime.
//!     let clock = ClockEngine::from_preset(preset, Arc::new(TokioTickSource::new()?))?;
//!
//!     // 3. Watch it.
//!     clock.on_update(|state| println!("{:?} {:?}", state.status, state.remaining_time));
//!
//!     // 4. Play.
//!     clock.push(Player::First);
//!     tokio::time::sleep(Duration::from_secs(2)).await;
//!     clock.push(Player::Second);
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Gameclock";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod registry;
pub mod state;
pub mod time;

/// A prelude module for easy importing of the most common Gameclock types.
pub mod prelude {
    pub use crate::common::{Mode, Player, Status};
    pub use crate::components::stage::{Stage, StageSpec};
    pub use crate::config::ClockConfig;
    pub use crate::engine::ClockEngine;
    pub use crate::error::ClockError;
    pub use crate::events::ClockEvent;
    pub use crate::registry::{ConfigRegistry, Preset};
    pub use crate::state::ClockState;
    pub use crate::time::{ManualTickSource, TickSource, TokioTickSource};
}
