pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod gravity;
pub mod ground;
pub mod hud;
pub mod input;
pub mod jump;
pub mod look;
pub mod math;
pub mod movement;
pub mod physics;
pub mod player;
pub mod trajectory;
pub mod trigger;

pub use checkpoint::{Checkpoint, CheckpointId, CheckpointManager};
pub use config::GameConfig;
pub use error::{GameError, Result};
pub use game::Game;
pub use input::{Action, Axis, InputState};
pub use physics::{PhysicsWorld, Pose};
pub use player::PlayerController;
pub use trigger::{LevelState, TriggerKind};

/// Outcome of advancing a frame-driven transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    InProgress,
    Done,
}
