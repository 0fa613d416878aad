use thiserror::Error;

use crate::checkpoint::CheckpointId;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no checkpoint has been claimed yet")]
    NoCheckpoint,

    #[error("unknown checkpoint: {0:?}")]
    UnknownCheckpoint(CheckpointId),

    #[error("player rigid body is missing from the physics world")]
    MissingBody,

    #[error("invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
