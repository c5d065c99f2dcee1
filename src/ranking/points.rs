use crate::model::{CheckpointType, StageType};

/// Points for finishing positions 1..=15 on a flat stage.
pub static FLAT_STAGE_POINTS: &[u32] = &[50, 30, 20, 18, 16, 14, 12, 10, 8, 7, 6, 5, 4, 3, 2];

pub static MEDIUM_MOUNTAIN_STAGE_POINTS: &[u32] =
    &[30, 25, 22, 19, 17, 15, 13, 11, 9, 7, 6, 5, 4, 3, 2];

/// Shared by high mountain stages and time trials.
pub static HIGH_MOUNTAIN_STAGE_POINTS: &[u32] =
    &[20, 17, 15, 13, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];

pub static SPRINT_POINTS: &[u32] = &[20, 17, 15, 13, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
pub static HC_CLIMB_POINTS: &[u32] = &[20, 15, 12, 10, 8, 6, 4, 2];
pub static C1_CLIMB_POINTS: &[u32] = &[10, 8, 6, 4, 2, 1];
pub static C2_CLIMB_POINTS: &[u32] = &[5, 3, 2, 1];
pub static C3_CLIMB_POINTS: &[u32] = &[2, 1];
pub static C4_CLIMB_POINTS: &[u32] = &[1];

/// Returns the per-rank points table for a stage type.
///
/// | Stage type      | Paid places | Winner |
/// |-----------------|-------------|--------|
/// | Flat            | 15          | 50     |
/// | Medium mountain | 15          | 30     |
/// | High mountain   | 15          | 20     |
/// | Time trial      | 15          | 20     |
pub fn stage_points_table(stage_type: StageType) -> &'static [u32] {
    match stage_type {
        StageType::Flat => FLAT_STAGE_POINTS,
        StageType::MediumMountain => MEDIUM_MOUNTAIN_STAGE_POINTS,
        StageType::HighMountain | StageType::TimeTrial => HIGH_MOUNTAIN_STAGE_POINTS,
    }
}

pub fn checkpoint_points_table(category: CheckpointType) -> &'static [u32] {
    match category {
        CheckpointType::Sprint => SPRINT_POINTS,
        CheckpointType::Hc => HC_CLIMB_POINTS,
        CheckpointType::C1 => C1_CLIMB_POINTS,
        CheckpointType::C2 => C2_CLIMB_POINTS,
        CheckpointType::C3 => C3_CLIMB_POINTS,
        CheckpointType::C4 => C4_CLIMB_POINTS,
    }
}

/// Points for a zero-based rank; ranks past the end of the table score 0.
pub fn points_for_rank(table: &[u32], rank: usize) -> u32 {
    table.get(rank).copied().unwrap_or(0)
}
