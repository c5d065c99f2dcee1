//! Ranking riders at a single checkpoint and awarding sprint/climb points.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use tracing::debug;

use crate::ids::RiderId;
use crate::model::Checkpoint;
use crate::ranking::points::{checkpoint_points_table, points_for_rank};

/// Orders riders by arrival time, earliest first.
///
/// The sort is stable: riders with identical timestamps keep the order in
/// which their results were registered.
pub fn rank_checkpoint(arrivals: &[(RiderId, NaiveTime)]) -> Vec<RiderId> {
    let mut ranked: Vec<&(RiderId, NaiveTime)> = arrivals.iter().collect();
    ranked.sort_by_key(|(_, at)| *at);
    ranked.into_iter().map(|(rider, _)| *rider).collect()
}

/// Ranks the checkpoint and pairs every rider with the points it earned.
/// Riders beyond the paid places appear with 0.
pub fn checkpoint_points(checkpoint: &Checkpoint) -> Vec<(RiderId, u32)> {
    let table = checkpoint_points_table(checkpoint.category());
    let awarded: Vec<(RiderId, u32)> = rank_checkpoint(checkpoint.arrivals())
        .into_iter()
        .enumerate()
        .map(|(rank, rider)| (rider, points_for_rank(table, rank)))
        .collect();

    debug!(
        checkpoint = %checkpoint.id(),
        category = ?checkpoint.category(),
        riders = awarded.len(),
        "Checkpoint points awarded"
    );
    awarded
}

/// Sums checkpoint points per rider over a set of checkpoints.
///
/// Each checkpoint is awarded exactly once, so a rider's entry is the sum of
/// one award per checkpoint it passed.
pub fn mountain_points<'a, I>(checkpoints: I) -> BTreeMap<RiderId, u32>
where
    I: IntoIterator<Item = &'a Checkpoint>,
{
    let mut totals = BTreeMap::new();
    for checkpoint in checkpoints {
        for (rider, points) in checkpoint_points(checkpoint) {
            *totals.entry(rider).or_insert(0) += points;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CheckpointId, StageId};
    use crate::model::CheckpointType;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn climb(category: CheckpointType, arrivals: &[(u32, NaiveTime)]) -> Checkpoint {
        let mut cp = Checkpoint::climb(CheckpointId(0), StageId(0), 40.0, category, 6.5, 8.0);
        for (rider, at) in arrivals {
            cp.record_arrival(RiderId(*rider), *at);
        }
        cp
    }

    #[test]
    fn test_rank_is_ascending_by_arrival() {
        let arrivals = vec![
            (RiderId(0), hms(11, 0, 30)),
            (RiderId(1), hms(11, 0, 10)),
            (RiderId(2), hms(11, 0, 20)),
        ];
        assert_eq!(
            rank_checkpoint(&arrivals),
            vec![RiderId(1), RiderId(2), RiderId(0)]
        );
    }

    #[test]
    fn test_rank_keeps_registration_order_on_ties() {
        let arrivals = vec![
            (RiderId(5), hms(11, 0, 0)),
            (RiderId(2), hms(11, 0, 0)),
            (RiderId(9), hms(10, 59, 0)),
        ];
        assert_eq!(
            rank_checkpoint(&arrivals),
            vec![RiderId(9), RiderId(5), RiderId(2)]
        );
    }

    #[test]
    fn test_c3_pays_two_places() {
        let cp = climb(
            CheckpointType::C3,
            &[(0, hms(11, 0, 3)), (1, hms(11, 0, 1)), (2, hms(11, 0, 2))],
        );
        assert_eq!(
            checkpoint_points(&cp),
            vec![(RiderId(1), 2), (RiderId(2), 1), (RiderId(0), 0)]
        );
    }

    #[test]
    fn test_mountain_points_sum_across_checkpoints() {
        let hc = climb(CheckpointType::Hc, &[(0, hms(11, 0, 0)), (1, hms(11, 0, 5))]);
        let mut sprint = Checkpoint::sprint(CheckpointId(1), StageId(0), 20.0);
        sprint.record_arrival(RiderId(1), hms(10, 30, 0));
        sprint.record_arrival(RiderId(0), hms(10, 30, 2));

        let totals = mountain_points([&hc, &sprint]);
        assert_eq!(totals[&RiderId(0)], 20 + 17);
        assert_eq!(totals[&RiderId(1)], 15 + 20);
    }

    #[test]
    fn test_empty_checkpoint_awards_nothing() {
        let cp = climb(CheckpointType::C1, &[]);
        assert!(checkpoint_points(&cp).is_empty());
        assert!(mountain_points([&cp]).is_empty());
    }
}
