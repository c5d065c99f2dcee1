use std::collections::BTreeMap;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::ids::{CheckpointId, RaceId, RiderId, StageId, TeamId};
use crate::model::types::{CheckpointType, StageState, StageType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub(crate) id: TeamId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) riders: Vec<RiderId>,
}

impl Team {
    pub(crate) fn new(id: TeamId, name: &str, description: &str) -> Self {
        Team {
            id,
            name: name.to_string(),
            description: description.to_string(),
            riders: Vec::new(),
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A registered rider and the raw timestamps it recorded in each stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub(crate) id: RiderId,
    pub(crate) team: TeamId,
    pub(crate) name: String,
    pub(crate) year_of_birth: u16,
    /// Start, every checkpoint in location order, finish.
    pub(crate) stage_times: BTreeMap<StageId, Vec<NaiveTime>>,
}

impl Rider {
    pub(crate) fn new(id: RiderId, team: TeamId, name: &str, year_of_birth: u16) -> Self {
        Rider {
            id,
            team,
            name: name.to_string(),
            year_of_birth,
            stage_times: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> RiderId {
        self.id
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year_of_birth(&self) -> u16 {
        self.year_of_birth
    }

    pub fn has_result(&self, stage: StageId) -> bool {
        self.stage_times.contains_key(&stage)
    }

    pub fn stage_times(&self, stage: StageId) -> Option<&[NaiveTime]> {
        self.stage_times.get(&stage).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub(crate) id: RaceId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) stages: Vec<StageId>,
}

impl Race {
    pub(crate) fn new(id: RaceId, name: &str, description: &str) -> Self {
        Race {
            id,
            name: name.to_string(),
            description: description.to_string(),
            stages: Vec::new(),
        }
    }

    pub fn id(&self) -> RaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stages(&self) -> &[StageId] {
        &self.stages
    }
}

/// Start and finish time of one rider in a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishEntry {
    pub rider: RiderId,
    pub start: NaiveTime,
    pub finish: NaiveTime,
}

impl FinishEntry {
    /// Total elapsed time, i.e. finish minus start.
    pub fn elapsed(&self) -> TimeDelta {
        self.finish - self.start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub(crate) id: StageId,
    pub(crate) race: RaceId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) length: f64,
    pub(crate) start_time: NaiveDateTime,
    pub(crate) stage_type: StageType,
    pub(crate) state: StageState,
    /// Ordered by increasing location.
    pub(crate) checkpoints: Vec<CheckpointId>,
    /// Kept in registration order; the ranking engine relies on it for
    /// stable tie-breaks.
    pub(crate) finishes: Vec<FinishEntry>,
}

impl Stage {
    pub(crate) fn new(
        id: StageId,
        race: RaceId,
        name: &str,
        description: &str,
        length: f64,
        start_time: NaiveDateTime,
        stage_type: StageType,
    ) -> Self {
        Stage {
            id,
            race,
            name: name.to_string(),
            description: description.to_string(),
            length,
            start_time,
            stage_type,
            state: StageState::InPreparation,
            checkpoints: Vec::new(),
            finishes: Vec::new(),
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn race(&self) -> RaceId {
        self.race
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn stage_type(&self) -> StageType {
        self.stage_type
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn checkpoints(&self) -> &[CheckpointId] {
        &self.checkpoints
    }

    pub fn finishes(&self) -> &[FinishEntry] {
        &self.finishes
    }

    pub(crate) fn remove_finish(&mut self, rider: RiderId) {
        self.finishes.retain(|entry| entry.rider != rider);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub(crate) id: CheckpointId,
    pub(crate) stage: StageId,
    pub(crate) location: f64,
    pub(crate) category: CheckpointType,
    pub(crate) length: Option<f64>,
    pub(crate) average_gradient: Option<f64>,
    /// Arrival timestamps in registration order.
    pub(crate) arrivals: Vec<(RiderId, NaiveTime)>,
}

impl Checkpoint {
    pub(crate) fn sprint(id: CheckpointId, stage: StageId, location: f64) -> Self {
        Checkpoint {
            id,
            stage,
            location,
            category: CheckpointType::Sprint,
            length: None,
            average_gradient: None,
            arrivals: Vec::new(),
        }
    }

    pub(crate) fn climb(
        id: CheckpointId,
        stage: StageId,
        location: f64,
        category: CheckpointType,
        average_gradient: f64,
        length: f64,
    ) -> Self {
        Checkpoint {
            id,
            stage,
            location,
            category,
            length: Some(length),
            average_gradient: Some(average_gradient),
            arrivals: Vec::new(),
        }
    }

    pub fn id(&self) -> CheckpointId {
        self.id
    }

    pub fn stage(&self) -> StageId {
        self.stage
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn category(&self) -> CheckpointType {
        self.category
    }

    pub fn length(&self) -> Option<f64> {
        self.length
    }

    pub fn average_gradient(&self) -> Option<f64> {
        self.average_gradient
    }

    pub fn arrivals(&self) -> &[(RiderId, NaiveTime)] {
        &self.arrivals
    }

    pub(crate) fn record_arrival(&mut self, rider: RiderId, at: NaiveTime) {
        self.arrivals.retain(|(r, _)| *r != rider);
        self.arrivals.push((rider, at));
    }

    pub(crate) fn remove_arrival(&mut self, rider: RiderId) {
        self.arrivals.retain(|(r, _)| *r != rider);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_finish_entry_elapsed() {
        let entry = FinishEntry {
            rider: RiderId(0),
            start: hms(10, 0, 0),
            finish: hms(12, 30, 15),
        };
        assert_eq!(entry.elapsed(), TimeDelta::seconds(2 * 3600 + 30 * 60 + 15));
    }

    #[test]
    fn test_record_arrival_overwrites_previous_entry() {
        let mut cp = Checkpoint::sprint(CheckpointId(0), StageId(0), 12.0);
        cp.record_arrival(RiderId(1), hms(10, 0, 0));
        cp.record_arrival(RiderId(2), hms(10, 0, 5));
        cp.record_arrival(RiderId(1), hms(10, 0, 9));

        assert_eq!(
            cp.arrivals(),
            &[(RiderId(2), hms(10, 0, 5)), (RiderId(1), hms(10, 0, 9))]
        );
    }

    #[test]
    fn test_remove_finish_keeps_other_riders_in_order() {
        let mut stage = Stage::new(
            StageId(0),
            RaceId(0),
            "s",
            "",
            100.0,
            chrono::NaiveDate::from_ymd_opt(2024, 7, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            StageType::Flat,
        );
        for r in 0..3 {
            stage.finishes.push(FinishEntry {
                rider: RiderId(r),
                start: hms(10, 0, 0),
                finish: hms(11, 0, r),
            });
        }
        stage.remove_finish(RiderId(1));

        let riders: Vec<_> = stage.finishes().iter().map(|e| e.rider).collect();
        assert_eq!(riders, vec![RiderId(0), RiderId(2)]);
    }
}
