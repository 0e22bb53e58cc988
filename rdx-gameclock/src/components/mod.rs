//! Contains the building blocks the clock engine is assembled from.
//!
//! This module provides the stage table (which time control is in force for a
//! player) and the policy functions (what a turn costs and earns). Both are
//! free of timing state; the `ClockEngine` owns all of that.

pub mod policy;
pub mod stage;
