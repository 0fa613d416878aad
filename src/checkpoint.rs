//! Checkpoints and the respawn sequence.
//!
//! `load` starts `Idle -> Loading`: the overlay fades to black, the player is moved
//! to the current checkpoint with its gravity restored, the overlay fades back and
//! the manager returns to `Idle`. The sequence is advanced once per frame.

use glam::Vec3;
use rapier3d::prelude::ColliderHandle;

use crate::error::{GameError, Result};
use crate::hud::{Fade, FadeOverlay};
use crate::physics::{PhysicsWorld, Pose};
use crate::player::PlayerController;
use crate::Progress;

/// Declaration index of a checkpoint within its level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckpointId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub name: String,
    /// Pose given to the player on respawn
    pub pose: Pose,
    pub gravity: Vec3,
    pub trigger: Option<ColliderHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RespawnPhase {
    FadingIn(Fade),
    FadingOut(Fade),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RespawnState {
    Idle,
    Loading(RespawnPhase),
}

pub struct CheckpointManager {
    checkpoints: Vec<Checkpoint>,
    current: Option<CheckpointId>,
    state: RespawnState,
}

impl CheckpointManager {
    pub fn new() -> Self {
        Self {
            checkpoints: Vec::new(),
            current: None,
            state: RespawnState::Idle,
        }
    }

    pub fn add(&mut self, checkpoint: Checkpoint) -> CheckpointId {
        self.checkpoints.push(checkpoint);
        CheckpointId(self.checkpoints.len() - 1)
    }

    pub fn get(&self, id: CheckpointId) -> Result<&Checkpoint> {
        self.checkpoints
            .get(id.0)
            .ok_or(GameError::UnknownCheckpoint(id))
    }

    pub(crate) fn set_trigger(&mut self, id: CheckpointId, trigger: ColliderHandle) {
        if let Some(checkpoint) = self.checkpoints.get_mut(id.0) {
            checkpoint.trigger = Some(trigger);
        }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn current(&self) -> Option<CheckpointId> {
        self.current
    }

    pub fn state(&self) -> RespawnState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RespawnState::Loading(_))
    }

    /// Makes `id` current unless another checkpoint already is. Returns whether
    /// the current checkpoint changed.
    pub fn claim(&mut self, id: CheckpointId) -> Result<bool> {
        let name = &self.get(id)?.name;
        match self.current {
            Some(current) if current == id => Ok(false),
            Some(current) => {
                log::debug!("Checkpoint {name:?} ignored, {current:?} already current");
                Ok(false)
            }
            None => {
                log::info!("Checkpoint {name:?} claimed");
                self.current = Some(id);
                Ok(true)
            }
        }
    }

    /// Starts the respawn sequence. A no-op returning `false` while one is running.
    pub fn load(&mut self, overlay: &FadeOverlay) -> Result<bool> {
        if self.is_loading() {
            return Ok(false);
        }
        let id = self.current.ok_or(GameError::NoCheckpoint)?;
        log::info!("Respawning at checkpoint {:?}", self.get(id)?.name);
        self.state = RespawnState::Loading(RespawnPhase::FadingIn(overlay.appear()));
        Ok(true)
    }

    /// Advances the respawn sequence by one frame.
    pub fn advance(
        &mut self,
        dt: f32,
        overlay: &mut FadeOverlay,
        player: &mut PlayerController,
        world: &mut PhysicsWorld,
    ) -> Result<Progress> {
        let RespawnState::Loading(phase) = self.state else {
            return Ok(Progress::Done);
        };
        match phase {
            RespawnPhase::FadingIn(mut fade) => {
                if fade.advance(overlay, dt) == Progress::Done {
                    self.restore(player, world)?;
                    self.state = RespawnState::Loading(RespawnPhase::FadingOut(overlay.faint()));
                } else {
                    self.state = RespawnState::Loading(RespawnPhase::FadingIn(fade));
                }
                Ok(Progress::InProgress)
            }
            RespawnPhase::FadingOut(mut fade) => {
                if fade.advance(overlay, dt) == Progress::Done {
                    self.state = RespawnState::Idle;
                    log::info!("Respawn finished");
                    Ok(Progress::Done)
                } else {
                    self.state = RespawnState::Loading(RespawnPhase::FadingOut(fade));
                    Ok(Progress::InProgress)
                }
            }
        }
    }

    fn restore(&self, player: &mut PlayerController, world: &mut PhysicsWorld) -> Result<()> {
        let id = self.current.ok_or(GameError::NoCheckpoint)?;
        let checkpoint = self.get(id)?;
        player.teleport(world, checkpoint.pose)?;
        world.gravity = checkpoint.gravity;
        player.reset(world)
    }
}

impl Default for CheckpointManager {
    fn default() -> Self {
        Self::new()
    }
}
