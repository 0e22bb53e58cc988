//! Contains common, primitive types shared across the clock engine.
//!
//! These are the small value types every other module speaks in: which player
//! is meant, which time-control policy a stage runs, and where the clock is in
//! its lifecycle. Using distinct types instead of bare integers and strings
//! keeps the engine's bookkeeping honest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two seats at the clock.
///
/// Serialized as the integers `0` and `1`, which is how players are addressed
/// in configuration files and state snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// Both players in seat order.
    pub const BOTH: [Player; 2] = [Player::First, Player::Second];

    /// The seat number, usable as an index into per-player pairs.
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// The opponent.
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.index() as u8
    }
}

impl TryFrom<u8> for Player {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::First),
            1 => Ok(Self::Second),
            other => Err(format!("player must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// The time-control policy a stage runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// A fixed increment is added after every completed turn.
    Fischer,
    /// The time actually spent is refunded after the turn, capped at the increment.
    Bronstein,
    /// The clock does not start eating into remaining time until the delay has passed.
    Delay,
    /// Whatever the mover spends is handed to the opponent.
    Hourglass,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fischer => "Fischer",
            Self::Bronstein => "Bronstein",
            Self::Delay => "Delay",
            Self::Hourglass => "Hourglass",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The clock's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Nobody has pushed yet; no time is running.
    #[default]
    Ready,
    /// One player's time is running down.
    Live,
    /// Counting is suspended and can be resumed.
    Paused,
    /// A player ran out of time. Terminal until reset.
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Live => "live",
            Self::Paused => "paused",
            Self::Done => "done",
        }
    }

    /// Check if a player's time is currently running.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Check if the clock can no longer change without a reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_swaps_seats() {
        assert_eq!(Player::First.other(), Player::Second);
        assert_eq!(Player::Second.other(), Player::First);
    }

    #[test]
    fn player_converts_from_seat_number() {
        assert_eq!(Player::try_from(0), Ok(Player::First));
        assert_eq!(Player::try_from(1), Ok(Player::Second));
        assert!(Player::try_from(2).is_err());
    }

    #[test]
    fn status_flags() {
        assert!(Status::Live.is_running());
        assert!(!Status::Paused.is_running());
        assert!(Status::Done.is_terminal());
        assert!(!Status::Ready.is_terminal());
    }
}
