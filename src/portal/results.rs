use chrono::{NaiveTime, TimeDelta};
use tracing::{debug, info, warn};

use crate::error::{PortalError, Result};
use crate::ids::{CheckpointId, RaceId, RiderId, StageId};
use crate::model::{FinishEntry, StageState};
use crate::portal::CyclingPortal;
use crate::ranking::aggregate::{
    self, Classification, RaceAggregate, StageSummary, aggregate_race,
};
use crate::ranking::checkpoint::{checkpoint_points, mountain_points, rank_checkpoint};
use crate::ranking::stage::{StageStanding, classify_stage};

impl CyclingPortal {
    /// Registers a rider's timestamps for a stage: start, one arrival per
    /// checkpoint in location order, finish.
    ///
    /// Checkpoint arrivals are also recorded on each checkpoint.
    #[tracing::instrument(skip(self, times), fields(times = times.len()))]
    pub fn register_rider_results_in_stage(
        &mut self,
        stage: StageId,
        rider: RiderId,
        times: &[NaiveTime],
    ) -> Result<()> {
        let s = self.stage(stage)?;
        let r = self.rider(rider)?;
        if r.has_result(stage) {
            warn!(stage = %stage, rider = %rider, "Duplicate result rejected");
            return Err(PortalError::DuplicatedResult {
                stage: stage.0,
                rider: rider.0,
            });
        }
        let expected = s.checkpoints.len() + 2;
        let (Some(&start), Some(&finish)) = (times.first(), times.last()) else {
            return Err(PortalError::InvalidCheckpointTimes {
                expected,
                actual: times.len(),
            });
        };
        if times.len() != expected {
            return Err(PortalError::InvalidCheckpointTimes {
                expected,
                actual: times.len(),
            });
        }
        if s.state != StageState::WaitingForResults {
            warn!(stage = %stage, state = %s.state, "Result rejected");
            return Err(PortalError::InvalidStageState(format!(
                "cannot register results for stage {stage} while it is {}",
                s.state
            )));
        }

        if let Some(s) = self.stages.get_mut(&stage) {
            s.finishes.push(FinishEntry {
                rider,
                start,
                finish,
            });
            for (cp, &at) in s.checkpoints.iter().zip(times.iter().skip(1)) {
                if let Some(cp) = self.checkpoints.get_mut(cp) {
                    cp.record_arrival(rider, at);
                }
            }
        }
        if let Some(r) = self.riders.get_mut(&rider) {
            r.stage_times.insert(stage, times.to_vec());
        }
        info!(stage = %stage, rider = %rider, "Result registered");
        Ok(())
    }

    /// The registered timestamps followed by the total elapsed time, shown as
    /// a time of day. Empty when the rider has no result for the stage.
    pub fn rider_results_in_stage(&self, stage: StageId, rider: RiderId) -> Result<Vec<NaiveTime>> {
        self.stage(stage)?;
        let Some(times) = self.rider(rider)?.stage_times(stage) else {
            return Ok(Vec::new());
        };
        let mut results = times.to_vec();
        if let (Some(&start), Some(&finish)) = (times.first(), times.last()) {
            let (elapsed, _) = NaiveTime::MIN.overflowing_add_signed(finish - start);
            results.push(elapsed);
        }
        Ok(results)
    }

    /// `None` for time trials and for riders without a result in the stage.
    pub fn rider_adjusted_elapsed_time_in_stage(
        &self,
        stage: StageId,
        rider: RiderId,
    ) -> Result<Option<TimeDelta>> {
        self.rider(rider)?;
        let standing = self
            .stage_standings(stage)?
            .into_iter()
            .find(|st| st.rider == rider);
        Ok(standing.and_then(|st| st.adjusted))
    }

    /// Removes the rider's result from the stage and from its checkpoints.
    /// Deleting a result that was never registered is a no-op.
    #[tracing::instrument(skip(self))]
    pub fn delete_rider_results_in_stage(&mut self, stage: StageId, rider: RiderId) -> Result<()> {
        let s = self.stage(stage)?;
        self.rider(rider)?;
        if s.state != StageState::WaitingForResults {
            return Err(PortalError::InvalidStageState(format!(
                "cannot delete results for stage {stage} while it is {}",
                s.state
            )));
        }

        if let Some(s) = self.stages.get_mut(&stage) {
            s.remove_finish(rider);
            for cp in &s.checkpoints {
                if let Some(cp) = self.checkpoints.get_mut(cp) {
                    cp.remove_arrival(rider);
                }
            }
        }
        if let Some(r) = self.riders.get_mut(&rider) {
            r.stage_times.remove(&stage);
        }
        debug!(stage = %stage, rider = %rider, "Result deleted");
        Ok(())
    }

    /// Rank, elapsed time, adjusted time and points of every rider with a
    /// result, fastest first.
    pub fn stage_standings(&self, stage: StageId) -> Result<Vec<StageStanding>> {
        Ok(classify_stage(self.stage(stage)?))
    }

    pub fn riders_rank_in_stage(&self, stage: StageId) -> Result<Vec<RiderId>> {
        Ok(self
            .stage_standings(stage)?
            .iter()
            .map(|st| st.rider)
            .collect())
    }

    /// Adjusted elapsed times in rank order. Time trials carry no bunching,
    /// so their riders' raw elapsed times are returned instead, the same
    /// times the general classification adds up. For a single rider on a
    /// time trial, [`Self::rider_adjusted_elapsed_time_in_stage`] returns
    /// `None`.
    pub fn ranked_adjusted_elapsed_times_in_stage(&self, stage: StageId) -> Result<Vec<TimeDelta>> {
        Ok(self
            .stage_standings(stage)?
            .iter()
            .map(StageStanding::classification_time)
            .collect())
    }

    /// Stage points in rank order.
    pub fn riders_points_in_stage(&self, stage: StageId) -> Result<Vec<u32>> {
        Ok(self
            .stage_standings(stage)?
            .iter()
            .map(|st| st.points)
            .collect())
    }

    /// Each rider's total checkpoint points in the stage, in stage rank order.
    pub fn riders_mountain_points_in_stage(&self, stage: StageId) -> Result<Vec<u32>> {
        let summary = self.stage_summary(stage)?;
        Ok(summary
            .standings
            .iter()
            .map(|st| summary.mountain_points.get(&st.rider).copied().unwrap_or(0))
            .collect())
    }

    /// Riders who passed the checkpoint, earliest arrival first.
    pub fn riders_rank_in_checkpoint(&self, checkpoint: CheckpointId) -> Result<Vec<RiderId>> {
        Ok(rank_checkpoint(self.checkpoint(checkpoint)?.arrivals()))
    }

    /// Checkpoint points in checkpoint rank order.
    pub fn riders_points_in_checkpoint(&self, checkpoint: CheckpointId) -> Result<Vec<u32>> {
        Ok(checkpoint_points(self.checkpoint(checkpoint)?)
            .into_iter()
            .map(|(_, points)| points)
            .collect())
    }

    fn stage_summary(&self, stage: StageId) -> Result<StageSummary> {
        let s = self.stage(stage)?;
        let checkpoints = s
            .checkpoints
            .iter()
            .map(|cp| self.checkpoint(*cp))
            .collect::<Result<Vec<_>>>()?;
        Ok(StageSummary {
            standings: classify_stage(s),
            mountain_points: mountain_points(checkpoints),
        })
    }

    /// Classifies every stage of the race once, for one aggregation call.
    fn race_summaries(&self, race: RaceId) -> Result<Vec<StageSummary>> {
        self.race(race)?
            .stages
            .iter()
            .map(|stage| self.stage_summary(*stage))
            .collect()
    }

    /// General, points and mountain classifications of the race.
    #[tracing::instrument(skip(self))]
    pub fn race_aggregate(&self, race: RaceId) -> Result<RaceAggregate> {
        let summaries = self.race_summaries(race)?;
        Ok(aggregate_race(race, &summaries))
    }

    pub fn general_classification(&self, race: RaceId) -> Result<Classification<TimeDelta>> {
        Ok(aggregate::general_classification(&self.race_summaries(race)?))
    }

    pub fn points_classification(&self, race: RaceId) -> Result<Classification<u32>> {
        Ok(aggregate::points_classification(&self.race_summaries(race)?))
    }

    pub fn mountain_classification(&self, race: RaceId) -> Result<Classification<u32>> {
        Ok(aggregate::mountain_classification(
            &self.race_summaries(race)?,
        ))
    }

    /// Riders ordered by least cumulative adjusted time.
    pub fn riders_general_classification_rank(&self, race: RaceId) -> Result<Vec<RiderId>> {
        Ok(self.general_classification(race)?.riders)
    }

    /// Cumulative times aligned with [`Self::riders_general_classification_rank`].
    pub fn general_classification_times_in_race(&self, race: RaceId) -> Result<Vec<TimeDelta>> {
        Ok(self.general_classification(race)?.values)
    }

    /// Riders ordered by most cumulative stage points.
    pub fn riders_points_classification_rank(&self, race: RaceId) -> Result<Vec<RiderId>> {
        Ok(self.points_classification(race)?.riders)
    }

    /// Cumulative stage points aligned with
    /// [`Self::riders_points_classification_rank`].
    pub fn riders_points_in_race(&self, race: RaceId) -> Result<Vec<u32>> {
        Ok(self.points_classification(race)?.values)
    }

    pub fn riders_mountain_points_classification_rank(&self, race: RaceId) -> Result<Vec<RiderId>> {
        Ok(self.mountain_classification(race)?.riders)
    }

    pub fn riders_mountain_points_in_race(&self, race: RaceId) -> Result<Vec<u32>> {
        Ok(self.mountain_classification(race)?.values)
    }
}
