//! Portal entities: teams, riders, races, stages and checkpoints.
//!
//! Entities hold raw data only. Ranks, adjusted times and points are derived
//! on demand by [`crate::ranking`], so a reloaded portal recomputes exactly
//! the same classifications.

pub mod entities;
pub mod types;

pub use entities::{Checkpoint, FinishEntry, Race, Rider, Stage, Team};
pub use types::{CheckpointType, StageState, StageType};
