//! Ranking and classification engine.
//!
//! Data flows one way: checkpoint arrival timestamps and stage finish times
//! are ranked per checkpoint and per stage, turned into adjusted times and
//! points, then summed into race-wide classifications.

pub mod aggregate;
pub mod checkpoint;
pub mod points;
pub mod stage;

pub use aggregate::{Classification, RaceAggregate, StageSummary};
pub use stage::StageStanding;
