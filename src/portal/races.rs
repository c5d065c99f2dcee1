use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PortalError, Result};
use crate::ids::{CheckpointId, RaceId, StageId};
use crate::model::{Checkpoint, CheckpointType, Race, Stage, StageState, StageType};
use crate::portal::CyclingPortal;
use crate::portal::validation::{validate_name, validate_stage_length};

/// Summary of a race as shown to portal users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceDetails {
    pub id: RaceId,
    pub name: String,
    pub description: String,
    pub number_of_stages: usize,
    pub total_length: f64,
}

impl std::fmt::Display for RaceDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID:{} Name:{} Description:{} Number of Stages:{} Total Length:{}",
            self.id, self.name, self.description, self.number_of_stages, self.total_length
        )
    }
}

impl CyclingPortal {
    pub fn race_ids(&self) -> Vec<RaceId> {
        self.races.keys().copied().collect()
    }

    #[tracing::instrument(skip(self, description))]
    pub fn create_race(&mut self, name: &str, description: &str) -> Result<RaceId> {
        validate_name(name)?;
        if self.races.values().any(|r| r.name == name) {
            return Err(PortalError::IllegalName(name.to_string()));
        }

        let id = self.ids.race();
        self.races.insert(id, Race::new(id, name, description));
        info!(race = %id, "Race created");
        Ok(id)
    }

    pub fn view_race_details(&self, race: RaceId) -> Result<RaceDetails> {
        let r = self.race(race)?;
        let total_length = r
            .stages
            .iter()
            .filter_map(|s| self.stages.get(s))
            .map(|s| s.length)
            .sum();
        Ok(RaceDetails {
            id: r.id,
            name: r.name.clone(),
            description: r.description.clone(),
            number_of_stages: r.stages.len(),
            total_length,
        })
    }

    /// Removes the race with all of its stages, checkpoints and results.
    #[tracing::instrument(skip(self))]
    pub fn remove_race_by_id(&mut self, race: RaceId) -> Result<()> {
        self.race(race)?;
        self.purge_race(race);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn remove_race_by_name(&mut self, name: &str) -> Result<()> {
        let race = self
            .races
            .values()
            .find(|r| r.name == name)
            .map(|r| r.id)
            .ok_or_else(|| PortalError::NameNotRecognised(name.to_string()))?;
        self.purge_race(race);
        Ok(())
    }

    fn purge_race(&mut self, race: RaceId) {
        let Some(removed) = self.races.remove(&race) else {
            return;
        };
        for stage in removed.stages {
            self.purge_stage(stage);
        }
        info!(race = %race, "Race removed");
    }

    pub fn number_of_stages(&self, race: RaceId) -> Result<usize> {
        Ok(self.race(race)?.stages.len())
    }

    /// Stages of the race in the order they were added.
    pub fn race_stages(&self, race: RaceId) -> Result<Vec<StageId>> {
        Ok(self.race(race)?.stages.clone())
    }

    #[tracing::instrument(skip(self, description))]
    pub fn add_stage_to_race(
        &mut self,
        race: RaceId,
        name: &str,
        description: &str,
        length: f64,
        start_time: NaiveDateTime,
        stage_type: StageType,
    ) -> Result<StageId> {
        self.race(race)?;
        validate_name(name)?;
        if self.stages.values().any(|s| s.name == name) {
            return Err(PortalError::IllegalName(name.to_string()));
        }
        validate_stage_length(length)?;

        let id = self.ids.stage();
        self.stages.insert(
            id,
            Stage::new(id, race, name, description, length, start_time, stage_type),
        );
        if let Some(r) = self.races.get_mut(&race) {
            r.stages.push(id);
        }
        info!(stage = %id, race = %race, ?stage_type, "Stage added");
        Ok(id)
    }

    pub fn stage_length(&self, stage: StageId) -> Result<f64> {
        Ok(self.stage(stage)?.length)
    }

    /// Removes the stage, its checkpoints and every rider result for it.
    #[tracing::instrument(skip(self))]
    pub fn remove_stage_by_id(&mut self, stage: StageId) -> Result<()> {
        let race = self.stage(stage)?.race;
        if let Some(r) = self.races.get_mut(&race) {
            r.stages.retain(|s| *s != stage);
        }
        self.purge_stage(stage);
        Ok(())
    }

    fn purge_stage(&mut self, stage: StageId) {
        let Some(removed) = self.stages.remove(&stage) else {
            return;
        };
        for cp in &removed.checkpoints {
            self.checkpoints.remove(cp);
        }
        for rider in removed.finishes.iter().map(|f| f.rider) {
            if let Some(r) = self.riders.get_mut(&rider) {
                r.stage_times.remove(&stage);
            }
        }
        info!(
            stage = %stage,
            checkpoints = removed.checkpoints.len(),
            results = removed.finishes.len(),
            "Stage removed"
        );
    }

    #[tracing::instrument(skip(self))]
    pub fn add_categorized_climb_to_stage(
        &mut self,
        stage: StageId,
        location: f64,
        category: CheckpointType,
        average_gradient: f64,
        length: f64,
    ) -> Result<CheckpointId> {
        self.stage(stage)?;
        if !category.is_climb() {
            return Err(PortalError::InvalidArgument(
                "a categorized climb needs a climb category".into(),
            ));
        }
        self.check_checkpoint_allowed(stage, location)?;

        let id = self.ids.checkpoint();
        let checkpoint =
            Checkpoint::climb(id, stage, location, category, average_gradient, length);
        self.insert_checkpoint(checkpoint);
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    pub fn add_intermediate_sprint_to_stage(
        &mut self,
        stage: StageId,
        location: f64,
    ) -> Result<CheckpointId> {
        self.check_checkpoint_allowed(stage, location)?;

        let id = self.ids.checkpoint();
        self.insert_checkpoint(Checkpoint::sprint(id, stage, location));
        Ok(id)
    }

    fn check_checkpoint_allowed(&self, stage: StageId, location: f64) -> Result<()> {
        let s = self.stage(stage)?;
        if !(0.0..=s.length).contains(&location) {
            return Err(PortalError::InvalidLocation {
                stage: stage.0,
                location,
                length: s.length,
            });
        }
        if s.state != StageState::InPreparation {
            warn!(stage = %stage, state = %s.state, "Checkpoint rejected");
            return Err(PortalError::InvalidStageState(format!(
                "cannot add checkpoints to stage {stage} while it is {}",
                s.state
            )));
        }
        if s.stage_type.is_time_trial() {
            return Err(PortalError::InvalidStageType(stage.0));
        }
        Ok(())
    }

    /// Keeps the stage's checkpoint list ordered by location; checkpoints at
    /// the same location stay in insertion order.
    fn insert_checkpoint(&mut self, checkpoint: Checkpoint) {
        let (id, stage, location) = (checkpoint.id, checkpoint.stage, checkpoint.location);
        if let Some(s) = self.stages.get_mut(&stage) {
            let position = s
                .checkpoints
                .iter()
                .position(|cp| {
                    self.checkpoints
                        .get(cp)
                        .is_some_and(|existing| existing.location > location)
                })
                .unwrap_or(s.checkpoints.len());
            s.checkpoints.insert(position, id);
        }
        self.checkpoints.insert(id, checkpoint);
        debug!(checkpoint = %id, stage = %stage, location, "Checkpoint added");
    }

    #[tracing::instrument(skip(self))]
    pub fn remove_checkpoint(&mut self, checkpoint: CheckpointId) -> Result<()> {
        let stage = self.checkpoint(checkpoint)?.stage;
        let s = self.stage_mut(stage)?;
        if s.state != StageState::InPreparation {
            warn!(checkpoint = %checkpoint, state = %s.state, "Checkpoint removal rejected");
            return Err(PortalError::InvalidStageState(format!(
                "cannot remove checkpoints from stage {stage} while it is {}",
                s.state
            )));
        }
        s.checkpoints.retain(|cp| *cp != checkpoint);
        self.checkpoints.remove(&checkpoint);
        debug!(checkpoint = %checkpoint, stage = %stage, "Checkpoint removed");
        Ok(())
    }

    /// Moves the stage from preparation to waiting for results. One way only.
    #[tracing::instrument(skip(self))]
    pub fn conclude_stage_preparation(&mut self, stage: StageId) -> Result<()> {
        let s = self.stage_mut(stage)?;
        if s.state == StageState::WaitingForResults {
            warn!(stage = %stage, "Stage already concluded");
            return Err(PortalError::InvalidStageState(format!(
                "stage {stage} is already waiting for results"
            )));
        }
        s.state = StageState::WaitingForResults;
        info!(stage = %stage, "Stage preparation concluded");
        Ok(())
    }

    /// Checkpoints of the stage ordered by location.
    pub fn stage_checkpoints(&self, stage: StageId) -> Result<Vec<CheckpointId>> {
        Ok(self.stage(stage)?.checkpoints.clone())
    }
}
