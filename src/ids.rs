//! Typed entity identifiers and the allocator that hands them out.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

entity_id!(TeamId);
entity_id!(RiderId);
entity_id!(RaceId);
entity_id!(StageId);
entity_id!(CheckpointId);

/// One monotonically increasing counter per entity type.
///
/// Identifiers are never reused while the allocator lives, even after the
/// entity they named is removed. Resetting means replacing the allocator.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_team: u32,
    next_rider: u32,
    next_race: u32,
    next_stage: u32,
    next_checkpoint: u32,
}

impl IdAllocator {
    pub fn team(&mut self) -> TeamId {
        TeamId(bump(&mut self.next_team))
    }

    pub fn rider(&mut self) -> RiderId {
        RiderId(bump(&mut self.next_rider))
    }

    pub fn race(&mut self) -> RaceId {
        RaceId(bump(&mut self.next_race))
    }

    pub fn stage(&mut self) -> StageId {
        StageId(bump(&mut self.next_stage))
    }

    pub fn checkpoint(&mut self) -> CheckpointId {
        CheckpointId(bump(&mut self.next_checkpoint))
    }
}

fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.team(), TeamId(0));
        assert_eq!(ids.team(), TeamId(1));
        assert_eq!(ids.rider(), RiderId(0));
        assert_eq!(ids.race(), RaceId(0));
        assert_eq!(ids.stage(), StageId(0));
        assert_eq!(ids.checkpoint(), CheckpointId(0));
        assert_eq!(ids.checkpoint(), CheckpointId(1));
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&RiderId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
