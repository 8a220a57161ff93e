//! Typed domain model for the Tempo planner.

pub mod blocks;
pub mod rule;
pub mod slot;
pub mod task;
