//! The time-control policies: what a running turn costs and what a finished
//! turn earns back.
//!
//! Both functions are pure. The engine feeds them the stage of the player in
//! question and the amounts it has measured; they never look at the opponent's
//! stage.

use crate::common::Mode;
use crate::components::stage::Stage;

/// Credits to apply once a player ends their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    /// Milliseconds added back to the player who just moved.
    pub mover: u64,
    /// Milliseconds added to the player whose turn begins.
    pub opponent: u64,
}

/// How much of `diff` to take from the running player's remaining time.
///
/// `elapsed` is the turn's cumulative elapsed time, already including `diff`.
/// Under `Delay`, nothing is charged until `elapsed` passes the stage's delay,
/// and only the part beyond the delay is charged on the recording that
/// crosses it.
pub fn charge(stage: &Stage, elapsed: u64, diff: u64) -> u64 {
    match stage.mode {
        Mode::Delay => {
            let delay = stage.increment;
            if elapsed.saturating_sub(diff) > delay {
                diff
            } else if elapsed > delay {
                elapsed - delay
            } else {
                0
            }
        }
        Mode::Fischer | Mode::Bronstein | Mode::Hourglass => diff,
    }
}

/// The end-of-turn credits for a mover who spent `spent` milliseconds.
pub fn settle(stage: &Stage, spent: u64) -> Settlement {
    match stage.mode {
        Mode::Fischer => Settlement {
            mover: stage.increment,
            opponent: 0,
        },
        Mode::Bronstein => Settlement {
            mover: spent.min(stage.increment),
            opponent: 0,
        },
        Mode::Hourglass => Settlement {
            mover: 0,
            opponent: spent,
        },
        Mode::Delay => Settlement::default(),
    }
}
