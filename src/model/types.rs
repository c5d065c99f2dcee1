//! Classification enums shared by entities and the ranking engine.

use serde::{Deserialize, Serialize};

/// Stage profile; selects the stage points table and whether riders are
/// bunched when adjusting elapsed times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    Flat,
    MediumMountain,
    HighMountain,
    TimeTrial,
}

impl StageType {
    pub fn is_time_trial(self) -> bool {
        matches!(self, StageType::TimeTrial)
    }
}

/// Checkpoint category: an intermediate sprint or a categorised climb,
/// from C4 (easiest) up to HC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointType {
    Sprint,
    C4,
    C3,
    C2,
    C1,
    Hc,
}

impl CheckpointType {
    pub fn is_climb(self) -> bool {
        !matches!(self, CheckpointType::Sprint)
    }
}

/// Lifecycle of a stage. The only transition is
/// `InPreparation -> WaitingForResults`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    #[default]
    InPreparation,
    WaitingForResults,
}

impl std::fmt::Display for StageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageState::InPreparation => f.write_str("in preparation"),
            StageState::WaitingForResults => f.write_str("waiting for results"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display_matches_portal_wording() {
        assert_eq!(StageState::InPreparation.to_string(), "in preparation");
        assert_eq!(
            StageState::WaitingForResults.to_string(),
            "waiting for results"
        );
    }

    #[test]
    fn test_only_sprint_is_not_a_climb() {
        assert!(!CheckpointType::Sprint.is_climb());
        assert!(CheckpointType::C4.is_climb());
        assert!(CheckpointType::Hc.is_climb());
    }
}
