//! The cycling portal: entity storage plus the operations that feed the
//! ranking engine.
//!
//! Operations are split by concern:
//! - [`teams`]: teams and riders
//! - [`races`]: races, stages, checkpoints and the stage lifecycle
//! - [`results`]: result registration and every ranking/classification query
//!
//! Every mutating operation validates all of its inputs before the first
//! write, so a rejected call leaves the portal exactly as it was.

mod races;
mod results;
mod teams;
pub mod validation;

pub use races::RaceDetails;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EntityKind, PortalError, Result};
use crate::ids::{CheckpointId, IdAllocator, RaceId, RiderId, StageId, TeamId};
use crate::model::{Checkpoint, Race, Rider, Stage, Team};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CyclingPortal {
    ids: IdAllocator,
    races: BTreeMap<RaceId, Race>,
    stages: BTreeMap<StageId, Stage>,
    checkpoints: BTreeMap<CheckpointId, Checkpoint>,
    riders: BTreeMap<RiderId, Rider>,
    teams: BTreeMap<TeamId, Team>,
}

impl CyclingPortal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entity and restarts all identifier counters.
    pub fn erase(&mut self) {
        *self = CyclingPortal::default();
        info!("Portal erased");
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams
            .get(&id)
            .ok_or_else(|| PortalError::not_found(EntityKind::Team, id))
    }

    pub fn rider(&self, id: RiderId) -> Result<&Rider> {
        self.riders
            .get(&id)
            .ok_or_else(|| PortalError::not_found(EntityKind::Rider, id))
    }

    pub fn race(&self, id: RaceId) -> Result<&Race> {
        self.races
            .get(&id)
            .ok_or_else(|| PortalError::not_found(EntityKind::Race, id))
    }

    pub fn stage(&self, id: StageId) -> Result<&Stage> {
        self.stages
            .get(&id)
            .ok_or_else(|| PortalError::not_found(EntityKind::Stage, id))
    }

    pub fn checkpoint(&self, id: CheckpointId) -> Result<&Checkpoint> {
        self.checkpoints
            .get(&id)
            .ok_or_else(|| PortalError::not_found(EntityKind::Checkpoint, id))
    }

    fn stage_mut(&mut self, id: StageId) -> Result<&mut Stage> {
        self.stages
            .get_mut(&id)
            .ok_or_else(|| PortalError::not_found(EntityKind::Stage, id))
    }
}
