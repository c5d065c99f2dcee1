//! Error types reported by the portal and the ranking engine.
//!
//! Each rejected operation maps to exactly one variant so callers can react
//! to the specific failure instead of matching on message text.

use thiserror::Error;

/// The kind of entity an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Team,
    Rider,
    Race,
    Stage,
    Checkpoint,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Team => "team",
            EntityKind::Rider => "rider",
            EntityKind::Race => "race",
            EntityKind::Stage => "stage",
            EntityKind::Checkpoint => "checkpoint",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{kind} ID {id} is not recognised")]
    IdNotRecognised { kind: EntityKind, id: u32 },

    #[error("rider {rider} already has a result for stage {stage}")]
    DuplicatedResult { stage: u32, rider: u32 },

    #[error("expected {expected} checkpoint times, got {actual}")]
    InvalidCheckpointTimes { expected: usize, actual: usize },

    #[error("invalid stage state: {0}")]
    InvalidStageState(String),

    #[error("location {location} is outside stage {stage} (length {length} km)")]
    InvalidLocation {
        stage: u32,
        location: f64,
        length: f64,
    },

    #[error("stage {0} is a time trial and cannot hold checkpoints")]
    InvalidStageType(u32),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("name {0:?} is already in use")]
    IllegalName(String),

    #[error("stage length {0} km is below the minimum")]
    InvalidLength(f64),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no race named {0:?}")]
    NameNotRecognised(String),

    #[error("portal file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("portal file could not be decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PortalError {
    pub fn not_found(kind: EntityKind, id: impl Into<u32>) -> Self {
        PortalError::IdNotRecognised {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
