//! Race-wide classifications built from per-stage results.
//!
//! Every rider with at least one stage result in the race takes part. A
//! stage the rider has no result for contributes zero time and zero points.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;

use crate::ids::{RaceId, RiderId};
use crate::ranking::stage::StageStanding;

/// Everything the aggregator needs from one stage, computed once per
/// aggregation call.
#[derive(Debug, Clone, Default)]
pub struct StageSummary {
    pub standings: Vec<StageStanding>,
    pub mountain_points: BTreeMap<RiderId, u32>,
}

/// Riders in classification order with their values aligned by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification<T> {
    pub riders: Vec<RiderId>,
    pub values: Vec<T>,
}

impl<T> Classification<T> {
    fn from_sorted(entries: Vec<(RiderId, T)>) -> Self {
        let (riders, values) = entries.into_iter().unzip();
        Classification { riders, values }
    }

    pub fn len(&self) -> usize {
        self.riders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiderId, &T)> {
        self.riders.iter().copied().zip(self.values.iter())
    }
}

/// Riders taking part in the race, in ascending id order.
fn participants(stages: &[StageSummary]) -> Vec<RiderId> {
    let mut riders: Vec<RiderId> = stages
        .iter()
        .flat_map(|s| s.standings.iter().map(|st| st.rider))
        .collect();
    riders.sort();
    riders.dedup();
    riders
}

/// Sums a per-stage value for every participant. Participants missing from
/// a stage get `zero` for it.
fn totals<T, F>(stages: &[StageSummary], zero: T, mut per_stage: F) -> Vec<(RiderId, T)>
where
    T: Copy + std::ops::Add<Output = T>,
    F: FnMut(&StageSummary, RiderId) -> Option<T>,
{
    participants(stages)
        .into_iter()
        .map(|rider| {
            let total = stages
                .iter()
                .filter_map(|stage| per_stage(stage, rider))
                .fold(zero, |acc, v| acc + v);
            (rider, total)
        })
        .collect()
}

/// General classification: least cumulative classification time first.
pub fn general_classification(stages: &[StageSummary]) -> Classification<TimeDelta> {
    let mut entries = totals(stages, TimeDelta::zero(), |stage, rider| {
        stage
            .standings
            .iter()
            .find(|st| st.rider == rider)
            .map(StageStanding::classification_time)
    });
    entries.sort_by_key(|(_, total)| *total);
    debug!(riders = entries.len(), "General classification computed");
    Classification::from_sorted(entries)
}

/// Points classification: most cumulative stage points first.
pub fn points_classification(stages: &[StageSummary]) -> Classification<u32> {
    let mut entries = totals(stages, 0u32, |stage, rider| {
        stage
            .standings
            .iter()
            .find(|st| st.rider == rider)
            .map(|st| st.points)
    });
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    debug!(riders = entries.len(), "Points classification computed");
    Classification::from_sorted(entries)
}

/// Mountain classification: most cumulative checkpoint points first.
pub fn mountain_classification(stages: &[StageSummary]) -> Classification<u32> {
    let mut entries = totals(stages, 0u32, |stage, rider| {
        stage.mountain_points.get(&rider).copied()
    });
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    debug!(riders = entries.len(), "Mountain classification computed");
    Classification::from_sorted(entries)
}

/// All three classifications of a race, as exported by the CLI.
#[derive(Debug, Serialize)]
pub struct RaceAggregate {
    pub race_id: RaceId,
    pub generated_at: DateTime<Utc>,
    pub stage_count: usize,
    #[serde(serialize_with = "crate::output::serialize_delta_classification")]
    pub general: Classification<TimeDelta>,
    pub points: Classification<u32>,
    pub mountain: Classification<u32>,
}

pub fn aggregate_race(race_id: RaceId, stages: &[StageSummary]) -> RaceAggregate {
    RaceAggregate {
        race_id,
        generated_at: Utc::now(),
        stage_count: stages.len(),
        general: general_classification(stages),
        points: points_classification(stages),
        mountain: mountain_classification(stages),
    }
}
