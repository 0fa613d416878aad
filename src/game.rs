use glam::Vec3;
use rapier3d::prelude::ColliderHandle;

use crate::checkpoint::CheckpointId;
use crate::config::{GameConfig, FIXED_DELTA_TIME};
use crate::error::{GameError, Result};
use crate::hud::{AngleIndicator, FadeOverlay};
use crate::input::InputState;
use crate::physics::{PhysicsWorld, Pose};
use crate::player::PlayerController;
use crate::trigger::{LevelState, TriggerAction, TriggerKind};

const INDICATOR_BAR_HEIGHT: f32 = 200.0;

/// Owns everything a level needs and orders the per-frame and fixed-step updates.
pub struct Game {
    pub world: PhysicsWorld,
    pub player: PlayerController,
    pub level: LevelState,
    pub overlay: FadeOverlay,
    pub indicator: AngleIndicator,
    config: GameConfig,
    accumulator: f32,
}

impl Game {
    pub fn new(config: GameConfig, spawn: Pose) -> Self {
        let mut world = PhysicsWorld::new(config.level.default_gravity);
        let player = PlayerController::spawn(&mut world, spawn, config.player.clone());
        log::info!("Player spawned at {:?}", spawn.position);

        Self {
            world,
            player,
            level: LevelState::new(config.level.bounds_edge),
            overlay: FadeOverlay::new(config.fade.appear_time),
            indicator: AngleIndicator::new(INDICATOR_BAR_HEIGHT),
            config,
            accumulator: 0.0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn add_solid(&mut self, pose: Pose, half_extents: Vec3) -> ColliderHandle {
        self.world.add_static_box(pose, half_extents)
    }

    /// Checkpoint restoring the level's default gravity.
    pub fn add_checkpoint(&mut self, name: &str, pose: Pose, half_extents: Vec3) -> CheckpointId {
        let gravity = self.config.level.default_gravity;
        self.add_checkpoint_with_gravity(name, pose, gravity, half_extents)
    }

    pub fn add_checkpoint_with_gravity(
        &mut self,
        name: &str,
        pose: Pose,
        gravity: Vec3,
        half_extents: Vec3,
    ) -> CheckpointId {
        self.level
            .add_checkpoint(&mut self.world, name, pose, gravity, half_extents)
    }

    pub fn add_volume(&mut self, kind: TriggerKind, pose: Pose, half_extents: Vec3) -> ColliderHandle {
        self.level.add_volume(&mut self.world, kind, pose, half_extents)
    }

    pub fn is_respawning(&self) -> bool {
        self.level.checkpoints.is_loading()
    }

    /// Angle bar marker offset for the player's target pitch.
    pub fn indicator_offset(&self) -> f32 {
        self.indicator.offset(self.player.target_angles().x)
    }

    /// One rendered frame: samples input, runs due fixed steps, then advances the
    /// respawn sequence and checks the level bounds.
    pub fn update(&mut self, input: &mut InputState, dt: f32) -> Result<()> {
        let dt = dt.min(0.1);
        self.player.update(input, dt);

        self.accumulator += dt;
        while self.accumulator >= FIXED_DELTA_TIME {
            self.fixed_update(FIXED_DELTA_TIME)?;
            self.accumulator -= FIXED_DELTA_TIME;
        }

        self.level
            .checkpoints
            .advance(dt, &mut self.overlay, &mut self.player, &mut self.world)?;
        self.check_respawn()
    }

    pub fn fixed_update(&mut self, dt: f32) -> Result<()> {
        self.player.fixed_update(&mut self.world, dt)?;
        let events = self.world.step(dt);
        for action in self.level.handle(&events) {
            match action {
                TriggerAction::Claim(id) => {
                    self.level.checkpoints.claim(id)?;
                }
                TriggerAction::Respawn => self.respawn()?,
            }
        }
        Ok(())
    }

    /// Starts the respawn sequence unless one is already running. Before any
    /// checkpoint is claimed the player is put back at the level's reset position
    /// at once, with the default gravity.
    pub fn respawn(&mut self) -> Result<()> {
        match self.level.checkpoints.load(&self.overlay) {
            Ok(_) => Ok(()),
            Err(GameError::NoCheckpoint) => self.reset_to_start(),
            Err(e) => Err(e),
        }
    }

    fn reset_to_start(&mut self) -> Result<()> {
        let position = self.config.level.reset_position;
        log::info!("No checkpoint claimed, resetting player to {position:?}");
        self.player.teleport(&mut self.world, Pose::from_position(position))?;
        self.world.gravity = self.config.level.default_gravity;
        self.player.reset(&mut self.world)
    }

    fn check_respawn(&mut self) -> Result<()> {
        if self.is_respawning() {
            return Ok(());
        }
        let position = self.player.pose(&self.world)?.position;
        if self.level.out_of_bounds(position) {
            log::info!("Player fell out of map, respawning");
            self.respawn()?;
        }
        Ok(())
    }
}
