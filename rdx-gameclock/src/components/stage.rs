//! Time-control stages and the ordered table that holds them.

use crate::common::Mode;
use crate::error::ClockError;
use serde::{Deserialize, Serialize};

/// One stage of a time control as it appears in configuration.
///
/// All durations are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Starting allotment for player 0 and player 1.
    pub time: [u64; 2],
    /// The completed-move count at which this stage takes over.
    /// `None` marks the initial stage.
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub move_number: Option<u32>,
    /// Increment or delay, interpreted according to `mode`.
    #[serde(default)]
    pub increment: u64,
    pub mode: Mode,
}

impl StageSpec {
    /// An initial stage giving both players the same allotment.
    pub fn new(mode: Mode, time: u64, increment: u64) -> Self {
        Self {
            time: [time, time],
            move_number: None,
            increment,
            mode,
        }
    }

    /// Makes this stage take over once a player has completed `moves` moves.
    pub fn starting_at(mut self, moves: u32) -> Self {
        self.move_number = Some(moves);
        self
    }
}

/// A stage with its position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    #[serde(rename = "i")]
    pub index: usize,
    pub time: [u64; 2],
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub move_number: Option<u32>,
    pub increment: u64,
    pub mode: Mode,
}

impl Stage {
    fn indexed(index: usize, spec: &StageSpec) -> Self {
        Self {
            index,
            time: spec.time,
            move_number: spec.move_number,
            increment: spec.increment,
            mode: spec.mode,
        }
    }
}

/// The full, ordered stage table of a clock.
///
/// Order is configuration order, not move order. Lookups match a move count
/// exactly rather than scanning for the highest threshold passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTable {
    stages: Vec<Stage>,
}

impl StageTable {
    /// Builds a table, assigning indices in configuration order.
    pub fn new(specs: &[StageSpec]) -> Result<Self, ClockError> {
        if specs.is_empty() {
            return Err(ClockError::EmptyStages);
        }
        let stages = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Stage::indexed(index, spec))
            .collect();
        Ok(Self { stages })
    }

    /// The stage both players start in.
    pub fn initial(&self) -> Stage {
        // `new` refuses empty tables.
        self.stages[0]
    }

    /// The first stage configured to begin at exactly `moves` completed moves.
    pub fn at_move(&self, moves: u32) -> Option<Stage> {
        self.stages
            .iter()
            .find(|stage| stage.move_number == Some(moves))
            .copied()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament() -> Vec<StageSpec> {
        vec![
            StageSpec::new(Mode::Delay, 7_200_000, 5_000),
            StageSpec::new(Mode::Delay, 3_600_000, 5_000).starting_at(40),
        ]
    }

    #[test]
    fn rejects_empty_tables() {
        assert!(matches!(StageTable::new(&[]), Err(ClockError::EmptyStages)));
    }

    #[test]
    fn assigns_indices_in_configuration_order() {
        let table = StageTable::new(&tournament()).unwrap();
        let indices: Vec<usize> = table.stages().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(table.initial().time, [7_200_000, 7_200_000]);
    }

    #[test]
    fn lookup_matches_exact_move_count_only() {
        let table = StageTable::new(&tournament()).unwrap();
        assert_eq!(table.at_move(40).map(|s| s.index), Some(1));
        assert_eq!(table.at_move(39), None);
        assert_eq!(table.at_move(41), None);
    }

    #[test]
    fn first_match_wins_regardless_of_move_order() {
        let specs = vec![
            StageSpec::new(Mode::Fischer, 1_000, 0),
            StageSpec::new(Mode::Fischer, 2_000, 0).starting_at(10),
            StageSpec::new(Mode::Fischer, 3_000, 0).starting_at(5),
            StageSpec::new(Mode::Bronstein, 4_000, 0).starting_at(10),
        ];
        let table = StageTable::new(&specs).unwrap();
        assert_eq!(table.at_move(5).map(|s| s.index), Some(2));
        assert_eq!(table.at_move(10).map(|s| s.index), Some(1));
    }
}
