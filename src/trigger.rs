//! Level trigger volumes and the single rule table reacting to them.
//!
//! | volume     | player enters           | player exits                      |
//! |------------|-------------------------|-----------------------------------|
//! | Checkpoint | claim                   | -                                 |
//! | Edge       | becomes current edge    | respawn if it is the current edge |
//! | Kill       | respawn                 | -                                 |
//! | Area       | joins the area set      | respawn when the set empties      |

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use rapier3d::prelude::ColliderHandle;

use crate::checkpoint::{Checkpoint, CheckpointId, CheckpointManager};
use crate::physics::{Layer, PhysicsWorld, Pose, TriggerEvent, TriggerEventKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Checkpoint(CheckpointId),
    Edge,
    Kill,
    Area,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerVolume {
    pub kind: TriggerKind,
    pub collider: ColliderHandle,
}

/// What the game should do in response to a trigger event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerAction {
    Claim(CheckpointId),
    Respawn,
}

/// Per-level state: trigger volumes, the current edge, the areas the player is
/// inside, and the checkpoints.
pub struct LevelState {
    pub checkpoints: CheckpointManager,
    pub bounds_edge: f32,
    volumes: Vec<TriggerVolume>,
    by_collider: HashMap<ColliderHandle, usize>,
    current_edge: Option<usize>,
    areas: HashSet<usize>,
}

impl LevelState {
    pub fn new(bounds_edge: f32) -> Self {
        Self {
            checkpoints: CheckpointManager::new(),
            bounds_edge,
            volumes: Vec::new(),
            by_collider: HashMap::new(),
            current_edge: None,
            areas: HashSet::new(),
        }
    }

    pub fn add_volume(&mut self, world: &mut PhysicsWorld, kind: TriggerKind, pose: Pose, half_extents: Vec3) -> ColliderHandle {
        let collider = world.add_trigger_box(pose, half_extents);
        self.by_collider.insert(collider, self.volumes.len());
        self.volumes.push(TriggerVolume { kind, collider });
        collider
    }

    /// Registers a checkpoint whose trigger box is centred on its respawn pose.
    pub fn add_checkpoint(
        &mut self,
        world: &mut PhysicsWorld,
        name: &str,
        pose: Pose,
        gravity: Vec3,
        half_extents: Vec3,
    ) -> CheckpointId {
        let id = self.checkpoints.add(Checkpoint {
            name: name.to_string(),
            pose,
            gravity,
            trigger: None,
        });
        let collider = self.add_volume(world, TriggerKind::Checkpoint(id), pose, half_extents);
        self.checkpoints.set_trigger(id, collider);
        id
    }

    pub fn volumes(&self) -> &[TriggerVolume] {
        &self.volumes
    }

    pub fn current_edge(&self) -> Option<&TriggerVolume> {
        self.current_edge.and_then(|index| self.volumes.get(index))
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Outside the cube `[-bounds_edge, bounds_edge]^3`.
    pub fn out_of_bounds(&self, position: Vec3) -> bool {
        position.abs().max_element() > self.bounds_edge
    }

    /// Applies the rule table to `events`, in order. Events from actors not on
    /// the player layer, or from colliders that are not level volumes, are ignored.
    pub fn handle(&mut self, events: &[TriggerEvent]) -> Vec<TriggerAction> {
        events
            .iter()
            .filter(|event| event.layer == Layer::Player)
            .filter_map(|event| {
                let index = *self.by_collider.get(&event.trigger)?;
                self.react(index, event.kind)
            })
            .collect()
    }

    fn react(&mut self, index: usize, event: TriggerEventKind) -> Option<TriggerAction> {
        let kind = self.volumes[index].kind;
        match (kind, event) {
            (TriggerKind::Checkpoint(id), TriggerEventKind::Enter) => Some(TriggerAction::Claim(id)),
            (TriggerKind::Edge, TriggerEventKind::Enter) => {
                self.current_edge = Some(index);
                log::debug!("Edge set");
                None
            }
            (TriggerKind::Edge, TriggerEventKind::Exit) if self.current_edge == Some(index) => {
                log::info!("Edge triggered");
                Some(TriggerAction::Respawn)
            }
            (TriggerKind::Kill, TriggerEventKind::Enter) => {
                log::info!("Killing obstacle hit");
                Some(TriggerAction::Respawn)
            }
            (TriggerKind::Area, TriggerEventKind::Enter) => {
                self.areas.insert(index);
                None
            }
            (TriggerKind::Area, TriggerEventKind::Exit) => {
                self.areas.remove(&index);
                if self.areas.is_empty() {
                    log::info!("Left the last gameplay area");
                    Some(TriggerAction::Respawn)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(trigger: ColliderHandle, kind: TriggerEventKind, layer: Layer) -> TriggerEvent {
        TriggerEvent {
            kind,
            trigger,
            other: ColliderHandle::invalid(),
            layer,
        }
    }

    fn level() -> (PhysicsWorld, LevelState) {
        (PhysicsWorld::default(), LevelState::new(1000.0))
    }

    #[test]
    fn non_player_events_are_ignored() {
        let (mut world, mut level) = level();
        let kill = level.add_volume(&mut world, TriggerKind::Kill, Pose::from_position(Vec3::ZERO), Vec3::ONE);
        assert_eq!(
            level.volumes(),
            &[TriggerVolume {
                kind: TriggerKind::Kill,
                collider: kill
            }]
        );
        let actions = level.handle(&[event(kill, TriggerEventKind::Enter, Layer::Default)]);
        assert!(actions.is_empty());
        let actions = level.handle(&[event(kill, TriggerEventKind::Enter, Layer::Player)]);
        assert_eq!(actions, vec![TriggerAction::Respawn]);
    }

    #[test]
    fn only_current_edge_triggers_on_exit() {
        let (mut world, mut level) = level();
        let a = level.add_volume(&mut world, TriggerKind::Edge, Pose::from_position(Vec3::ZERO), Vec3::ONE);
        let b = level.add_volume(&mut world, TriggerKind::Edge, Pose::from_position(Vec3::X * 5.0), Vec3::ONE);

        assert!(level.handle(&[event(a, TriggerEventKind::Exit, Layer::Player)]).is_empty());
        level.handle(&[
            event(a, TriggerEventKind::Enter, Layer::Player),
            event(b, TriggerEventKind::Enter, Layer::Player),
        ]);
        assert_eq!(level.current_edge().map(|v| v.collider), Some(b));
        assert!(level.handle(&[event(a, TriggerEventKind::Exit, Layer::Player)]).is_empty());
        assert_eq!(
            level.handle(&[event(b, TriggerEventKind::Exit, Layer::Player)]),
            vec![TriggerAction::Respawn]
        );
    }

    #[test]
    fn leaving_last_area_respawns() {
        let (mut world, mut level) = level();
        let a = level.add_volume(&mut world, TriggerKind::Area, Pose::from_position(Vec3::ZERO), Vec3::ONE);
        let b = level.add_volume(&mut world, TriggerKind::Area, Pose::from_position(Vec3::X), Vec3::ONE);

        level.handle(&[
            event(a, TriggerEventKind::Enter, Layer::Player),
            event(a, TriggerEventKind::Enter, Layer::Player),
            event(b, TriggerEventKind::Enter, Layer::Player),
        ]);
        assert_eq!(level.area_count(), 2);
        assert!(level.handle(&[event(a, TriggerEventKind::Exit, Layer::Player)]).is_empty());
        assert_eq!(
            level.handle(&[event(b, TriggerEventKind::Exit, Layer::Player)]),
            vec![TriggerAction::Respawn]
        );
    }

    #[test]
    fn checkpoint_enter_requests_claim() {
        let (mut world, mut level) = level();
        let id = level.add_checkpoint(
            &mut world,
            "start",
            Pose::from_position(Vec3::ZERO),
            Vec3::NEG_Y * 9.81,
            Vec3::ONE,
        );
        let collider = level.checkpoints.get(id).unwrap().trigger.unwrap();
        assert_eq!(
            level.handle(&[event(collider, TriggerEventKind::Enter, Layer::Player)]),
            vec![TriggerAction::Claim(id)]
        );
        assert!(level.handle(&[event(collider, TriggerEventKind::Exit, Layer::Player)]).is_empty());
    }

    #[test]
    fn bounds_check_uses_largest_coordinate() {
        let level = LevelState::new(100.0);
        assert!(!level.out_of_bounds(Vec3::new(99.0, -99.0, 50.0)));
        assert!(level.out_of_bounds(Vec3::new(0.0, -100.5, 0.0)));
    }
}
