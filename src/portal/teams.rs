use tracing::{debug, info};

use crate::error::{EntityKind, PortalError, Result};
use crate::ids::{RiderId, TeamId};
use crate::model::{Rider, Team};
use crate::portal::CyclingPortal;
use crate::portal::validation::{validate_name, validate_rider};

impl CyclingPortal {
    pub fn teams(&self) -> Vec<TeamId> {
        self.teams.keys().copied().collect()
    }

    #[tracing::instrument(skip(self, description))]
    pub fn create_team(&mut self, name: &str, description: &str) -> Result<TeamId> {
        validate_name(name)?;
        if self.teams.values().any(|t| t.name == name) {
            return Err(PortalError::IllegalName(name.to_string()));
        }

        let id = self.ids.team();
        self.teams.insert(id, Team::new(id, name, description));
        info!(team = %id, "Team created");
        Ok(id)
    }

    /// Removes the team together with all of its riders and their results.
    #[tracing::instrument(skip(self))]
    pub fn remove_team(&mut self, team: TeamId) -> Result<()> {
        let riders = self.team(team)?.riders.clone();
        for rider in riders {
            self.purge_rider(rider);
        }
        self.teams.remove(&team);
        info!(team = %team, "Team removed");
        Ok(())
    }

    pub fn team_riders(&self, team: TeamId) -> Result<Vec<RiderId>> {
        Ok(self.team(team)?.riders.clone())
    }

    #[tracing::instrument(skip(self))]
    pub fn create_rider(&mut self, team: TeamId, name: &str, year_of_birth: u16) -> Result<RiderId> {
        if !self.teams.contains_key(&team) {
            return Err(PortalError::not_found(EntityKind::Team, team));
        }
        validate_rider(name, year_of_birth)?;

        let id = self.ids.rider();
        self.riders
            .insert(id, Rider::new(id, team, name, year_of_birth));
        if let Some(t) = self.teams.get_mut(&team) {
            t.riders.push(id);
        }
        info!(rider = %id, "Rider created");
        Ok(id)
    }

    /// Removes the rider and every result entry it left in stages and
    /// checkpoints.
    #[tracing::instrument(skip(self))]
    pub fn remove_rider(&mut self, rider: RiderId) -> Result<()> {
        self.rider(rider)?;
        self.purge_rider(rider);
        info!(rider = %rider, "Rider removed");
        Ok(())
    }

    fn purge_rider(&mut self, rider: RiderId) {
        let Some(removed) = self.riders.remove(&rider) else {
            return;
        };
        if let Some(team) = self.teams.get_mut(&removed.team) {
            team.riders.retain(|r| *r != rider);
        }
        for stage in removed.stage_times.keys() {
            if let Some(stage) = self.stages.get_mut(stage) {
                stage.remove_finish(rider);
                for cp in &stage.checkpoints {
                    if let Some(cp) = self.checkpoints.get_mut(cp) {
                        cp.remove_arrival(rider);
                    }
                }
            }
        }
        debug!(
            rider = %rider,
            stages = removed.stage_times.len(),
            "Rider results purged"
        );
    }
}
