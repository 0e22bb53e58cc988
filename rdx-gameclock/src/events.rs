//! Defines the event type broadcast by the clock engine.
//!
//! Events complement the state observer: the observer sees every snapshot,
//! events tell subscribers *what happened* without diffing snapshots.

use crate::common::Player;

/// Something a clock did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEvent {
    /// Fired by the first push after construction or reset.
    Started { white: Player },
    /// Fired when a push completes a turn.
    TurnEnded {
        player: Player,
        /// The mover's completed turns, this one included.
        moves: u32,
        spent_ms: u64,
    },
    /// Fired when a player enters a new stage of the time control.
    StageAdvanced { player: Player, stage: usize },
    /// Fired when counting is suspended; `player` is the one who was running.
    Paused { player: Player },
    /// Fired when counting resumes for `player`.
    Resumed { player: Player },
    /// Fired on every manual time adjustment.
    TimeAdded { player: Player, ms: i64 },
    /// Fired once when a player's time runs out.
    Expired { player: Player },
    /// Fired when the clock returns to its initial state.
    Reset,
}
