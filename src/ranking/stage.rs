//! Stage ranking, bunch time adjustment and stage points.
//!
//! Riders are ranked by total elapsed time. On every stage except time
//! trials, riders who cross the line less than [`BUNCH_GAP_MS`] apart form a
//! bunch and all receive the bunch leader's time. Bunching is transitive: it
//! is computed over consecutive riders in rank order, so a long chain of
//! close finishers collapses into one group even when its first and last
//! members are more than a second apart.

use chrono::TimeDelta;
use serde::Serialize;
use tracing::debug;

use crate::ids::RiderId;
use crate::model::{FinishEntry, Stage, StageType};
use crate::ranking::points::{points_for_rank, stage_points_table};

/// Gap, in milliseconds, below which two consecutive finishers share a bunch.
pub const BUNCH_GAP_MS: i64 = 1_000;

/// One rider's line in a stage classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageStanding {
    pub rider: RiderId,
    #[serde(serialize_with = "crate::output::serialize_delta")]
    pub elapsed: TimeDelta,
    /// `None` on time trials.
    #[serde(serialize_with = "crate::output::serialize_opt_delta")]
    pub adjusted: Option<TimeDelta>,
    pub points: u32,
}

impl StageStanding {
    /// The time that counts toward the general classification: the adjusted
    /// time where bunching applies, the raw elapsed time otherwise.
    pub fn classification_time(&self) -> TimeDelta {
        self.adjusted.unwrap_or(self.elapsed)
    }
}

/// Sorts finishers by elapsed time, fastest first, keeping registration
/// order between riders with identical times.
pub fn rank_stage(finishes: &[FinishEntry]) -> Vec<(RiderId, TimeDelta)> {
    let mut ranked: Vec<(RiderId, TimeDelta)> = finishes
        .iter()
        .map(|entry| (entry.rider, entry.elapsed()))
        .collect();
    ranked.sort_by_key(|(_, elapsed)| *elapsed);
    ranked
}

/// Bunches an already ranked list of elapsed times.
///
/// Returns one adjusted time per input, aligned by index.
pub fn adjust_elapsed_times(ranked: &[TimeDelta]) -> Vec<TimeDelta> {
    let gap = TimeDelta::milliseconds(BUNCH_GAP_MS);
    let mut adjusted = Vec::with_capacity(ranked.len());
    let mut previous: Option<TimeDelta> = None;
    let mut leader = TimeDelta::zero();

    for &elapsed in ranked {
        match previous {
            Some(prev) if elapsed - prev < gap => {}
            _ => leader = elapsed,
        }
        adjusted.push(leader);
        previous = Some(elapsed);
    }
    adjusted
}

/// Full classification of a stage: rank, elapsed and adjusted times, points.
pub fn classify_stage(stage: &Stage) -> Vec<StageStanding> {
    let ranked = rank_stage(stage.finishes());
    let times: Vec<TimeDelta> = ranked.iter().map(|(_, elapsed)| *elapsed).collect();
    let adjusted = match stage.stage_type() {
        StageType::TimeTrial => None,
        _ => Some(adjust_elapsed_times(&times)),
    };
    let table = stage_points_table(stage.stage_type());

    let standings: Vec<StageStanding> = ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (rider, elapsed))| StageStanding {
            rider,
            elapsed,
            adjusted: adjusted.as_ref().and_then(|a| a.get(rank).copied()),
            points: points_for_rank(table, rank),
        })
        .collect();

    debug!(
        stage = %stage.id(),
        stage_type = ?stage.stage_type(),
        riders = standings.len(),
        "Stage classified"
    );
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{RaceId, StageId};
    use chrono::{NaiveDate, NaiveTime};

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap()
    }

    fn secs(s: i64) -> TimeDelta {
        TimeDelta::seconds(s)
    }

    fn stage_with(stage_type: StageType, finishes: &[(u32, NaiveTime)]) -> Stage {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut stage = Stage::new(StageId(0), RaceId(0), "s1", "", 180.0, start, stage_type);
        for (rider, finish) in finishes {
            stage.finishes.push(FinishEntry {
                rider: RiderId(*rider),
                start: at(10, 0, 0, 0),
                finish: *finish,
            });
        }
        stage
    }

    #[test]
    fn test_rank_stage_fastest_first() {
        let stage = stage_with(
            StageType::Flat,
            &[
                (0, at(14, 0, 0, 0)),
                (1, at(13, 0, 0, 0)),
                (2, at(13, 30, 0, 0)),
            ],
        );
        let riders: Vec<_> = rank_stage(stage.finishes()).iter().map(|r| r.0).collect();
        assert_eq!(riders, vec![RiderId(1), RiderId(2), RiderId(0)]);
    }

    #[test]
    fn test_rank_stage_stable_on_ties() {
        let stage = stage_with(
            StageType::Flat,
            &[(7, at(13, 0, 0, 0)), (3, at(13, 0, 0, 0)), (5, at(12, 0, 0, 0))],
        );
        let riders: Vec<_> = rank_stage(stage.finishes()).iter().map(|r| r.0).collect();
        assert_eq!(riders, vec![RiderId(5), RiderId(7), RiderId(3)]);
    }

    #[test]
    fn test_bunching_is_transitive() {
        let t = secs(3600);
        let ranked = vec![
            t,
            t + TimeDelta::milliseconds(500),
            t + TimeDelta::milliseconds(900),
            t + TimeDelta::milliseconds(1_500),
        ];
        // The last rider is only 0.6s behind the third, so the chain holds.
        assert_eq!(adjust_elapsed_times(&ranked), vec![t, t, t, t]);
    }

    #[test]
    fn test_gap_of_one_second_breaks_the_bunch() {
        let t = secs(3600);
        let ranked = vec![
            t,
            t + TimeDelta::milliseconds(500),
            t + TimeDelta::milliseconds(900),
            t + TimeDelta::milliseconds(1_900),
        ];
        assert_eq!(
            adjust_elapsed_times(&ranked),
            vec![t, t, t, t + TimeDelta::milliseconds(1_900)]
        );
    }

    #[test]
    fn test_isolated_riders_keep_their_time() {
        let ranked = vec![secs(100), secs(105), secs(110)];
        assert_eq!(adjust_elapsed_times(&ranked), ranked);
    }

    #[test]
    fn test_adjustment_is_idempotent() {
        let ranked = vec![
            secs(100),
            secs(100) + TimeDelta::milliseconds(400),
            secs(103),
            secs(103) + TimeDelta::milliseconds(999),
        ];
        let once = adjust_elapsed_times(&ranked);
        assert_eq!(adjust_elapsed_times(&once), once);
    }

    #[test]
    fn test_adjust_empty_field() {
        assert!(adjust_elapsed_times(&[]).is_empty());
    }

    #[test]
    fn test_classify_flat_stage_with_bunch() {
        let stage = stage_with(
            StageType::Flat,
            &[
                (0, at(12, 30, 0, 0)),
                (1, at(12, 30, 0, 700)),
                (2, at(12, 35, 0, 0)),
            ],
        );
        let standings = classify_stage(&stage);

        let riders: Vec<_> = standings.iter().map(|s| s.rider).collect();
        assert_eq!(riders, vec![RiderId(0), RiderId(1), RiderId(2)]);

        let leader = secs(2 * 3600 + 30 * 60);
        assert_eq!(standings[0].adjusted, Some(leader));
        assert_eq!(standings[1].adjusted, Some(leader));
        assert_eq!(standings[2].adjusted, Some(secs(2 * 3600 + 35 * 60)));

        let points: Vec<_> = standings.iter().map(|s| s.points).collect();
        assert_eq!(points, vec![50, 30, 20]);
    }

    #[test]
    fn test_time_trial_has_no_adjusted_times() {
        let stage = stage_with(
            StageType::TimeTrial,
            &[(0, at(10, 30, 0, 0)), (1, at(10, 30, 0, 200))],
        );
        let standings = classify_stage(&stage);
        assert!(standings.iter().all(|s| s.adjusted.is_none()));
        assert_eq!(standings[1].classification_time(), standings[1].elapsed);
        assert_eq!(standings[0].points, 20);
        assert_eq!(standings[1].points, 17);
    }

    #[test]
    fn test_sixteenth_place_scores_zero() {
        let finishes: Vec<(u32, NaiveTime)> = (0..16)
            .map(|r| (r, at(12, r, 0, 0)))
            .collect();
        let stage = stage_with(StageType::MediumMountain, &finishes);
        let standings = classify_stage(&stage);
        assert_eq!(standings[0].points, 30);
        assert_eq!(standings[14].points, 2);
        assert_eq!(standings[15].points, 0);
    }
}
