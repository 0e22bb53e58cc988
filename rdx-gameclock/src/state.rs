//! The read-only snapshot of a clock.

use crate::common::{Player, Status};
use crate::components::stage::Stage;
use serde::Serialize;

/// Everything a consumer may know about a clock at one instant.
///
/// A snapshot is an owned copy. Mutating the clock afterwards does not change
/// a snapshot already taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    pub name: Option<String>,
    /// Completed turns per player.
    #[serde(rename = "move")]
    pub moves: [u32; 2],
    /// Milliseconds left per player. Never negative.
    pub remaining_time: [u64; 2],
    /// The player who most recently ended a turn.
    pub last_player: Option<Player>,
    /// The player whose clock started first.
    pub white: Option<Player>,
    /// Per player, the elapsed time of each of their turns, the last entry
    /// being the turn in progress.
    pub log: [Vec<u64>; 2],
    pub status: Status,
    /// The stage currently in force for each player.
    pub stage: [Stage; 2],
    /// When elapsed time was last recorded, in tick-source milliseconds.
    pub timestamp: Option<u64>,
    pub stages: Vec<Stage>,
}

impl ClockState {
    pub fn remaining(&self, player: Player) -> u64 {
        self.remaining_time[player.index()]
    }

    /// The player whose time is running, if any.
    pub fn active_player(&self) -> Option<Player> {
        match self.status {
            Status::Live => self.last_player.map(Player::other),
            _ => None,
        }
    }
}
