use std::collections::HashSet;

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::Ball;
use rapier3d::prelude::*;

/// Physics layers. The discriminant is the bit index used in layer masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Default = 0,
    Player = 1,
    Trigger = 2,
}

impl Layer {
    pub fn bit(self) -> u32 {
        1 << self as u32
    }

    fn group(self) -> Group {
        Group::from_bits_truncate(self.bit())
    }

    fn from_group(group: Group) -> Option<Self> {
        [Layer::Default, Layer::Player, Layer::Trigger]
            .into_iter()
            .find(|layer| group.bits() & layer.bit() != 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn all_except(layer: Layer) -> Self {
        LayerMask(!layer.bit())
    }

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    fn filter(self) -> QueryFilter<'static> {
        QueryFilter::default()
            .exclude_sensors()
            .groups(InteractionGroups::new(Group::ALL, Group::from_bits_truncate(self.0)))
    }
}

/// Position and orientation of an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn down(&self) -> Vec3 {
        -self.up()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub collider: ColliderHandle,
    pub distance: f32,
    pub normal: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEventKind {
    Enter,
    Exit,
}

/// Another collider started or stopped overlapping a trigger volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    pub kind: TriggerEventKind,
    pub trigger: ColliderHandle,
    pub other: ColliderHandle,
    pub layer: Layer,
}

pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_rotation(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn from_rotation(q: &UnitQuaternion<Real>) -> Quat {
    let c = q.quaternion().coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

fn to_isometry(pose: Pose) -> Isometry<Real> {
    Isometry::from_parts(to_vector(pose.position).into(), to_rotation(pose.rotation))
}

/// Rapier world plus the current gravity vector, which the player may rotate.
pub struct PhysicsWorld {
    pub gravity: Vec3,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    /// Sensor colliders in declaration order
    triggers: Vec<ColliderHandle>,
    /// (trigger, other) pairs overlapping after the last step
    overlaps: HashSet<(ColliderHandle, ColliderHandle)>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            triggers: Vec::new(),
            overlaps: HashSet::new(),
        }
    }

    /// Static solid box on the default layer.
    pub fn add_static_box(&mut self, pose: Pose, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(to_isometry(pose))
            .collision_groups(InteractionGroups::new(Layer::Default.group(), Group::ALL))
            .build();
        let handle = self.collider_set.insert(collider);
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Non-colliding box reporting enter/exit events from `step`.
    pub fn add_trigger_box(&mut self, pose: Pose, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(to_isometry(pose))
            .sensor(true)
            .collision_groups(InteractionGroups::new(Layer::Trigger.group(), Group::ALL))
            .build();
        let handle = self.collider_set.insert(collider);
        self.triggers.push(handle);
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Dynamic capsule with locked rotations, on the player layer.
    pub fn add_player_body(&mut self, pose: Pose, radius: f32, half_height: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .position(to_isometry(pose))
            .lock_rotations()
            .ccd_enabled(true)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .friction(0.0)
            .collision_groups(InteractionGroups::new(Layer::Player.group(), Group::ALL))
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<Pose> {
        let body = self.rigid_body_set.get(handle)?;
        Some(Pose::new(
            from_vector(body.translation()),
            from_rotation(body.rotation()),
        ))
    }

    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, pose: Pose) -> bool {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return false;
        };
        body.set_translation(to_vector(pose.position), true);
        body.set_rotation(to_rotation(pose.rotation), true);
        self.sync_colliders();
        true
    }

    pub fn set_body_rotation(&mut self, handle: RigidBodyHandle, rotation: Quat) -> bool {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return false;
        };
        body.set_rotation(to_rotation(rotation), true);
        true
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.linvel()))
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) -> bool {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return false;
        };
        body.set_linvel(to_vector(velocity), true);
        true
    }

    /// Replaces the body's continuous force with one producing `acceleration`
    /// regardless of mass. Persists until changed or cleared.
    pub fn set_acceleration(&mut self, handle: RigidBodyHandle, acceleration: Vec3) -> bool {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return false;
        };
        let mass = body.mass();
        body.reset_forces(true);
        if acceleration != Vec3::ZERO {
            body.add_force(to_vector(acceleration * mass), true);
        }
        true
    }

    /// Casts a ray and returns the closest solid hit on a layer in `mask`.
    pub fn cast_ray(&self, origin: Vec3, dir: Vec3, max_dist: f32, mask: LayerMask) -> Option<RayHit> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(dir));
        let (collider, hit) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_dist,
            true,
            mask.filter(),
        )?;
        Some(RayHit {
            collider,
            distance: hit.time_of_impact,
            normal: from_vector(&hit.normal),
        })
    }

    /// Sweeps a sphere along `dir` and returns the travelled distance at first contact.
    /// A sphere already touching geometry reports zero.
    pub fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        mask: LayerMask,
    ) -> Option<f32> {
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(origin.x, origin.y, origin.z);
        let shape_vel = to_vector(dir.normalize_or_zero());
        let (_, hit) = self.query_pipeline.cast_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape_vel,
            &shape,
            ShapeCastOptions::with_max_time_of_impact(max_dist),
            mask.filter(),
        )?;
        Some(hit.time_of_impact)
    }

    /// Advances the simulation and reports trigger overlap changes.
    /// Enter events come before exit events; each group is ordered by trigger declaration.
    pub fn step(&mut self, dt: f32) -> Vec<TriggerEvent> {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &to_vector(self.gravity),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.poll_triggers()
    }

    fn sync_colliders(&mut self) {
        self.rigid_body_set
            .propagate_modified_body_positions_to_colliders(&mut self.collider_set);
        self.query_pipeline.update(&self.collider_set);
    }

    fn poll_triggers(&mut self) -> Vec<TriggerEvent> {
        let mut current = HashSet::new();
        for &trigger in &self.triggers {
            let Some(collider) = self.collider_set.get(trigger) else {
                continue;
            };
            let filter = QueryFilter::default()
                .exclude_sensors()
                .exclude_collider(trigger);
            self.query_pipeline.intersections_with_shape(
                &self.rigid_body_set,
                &self.collider_set,
                collider.position(),
                collider.shape(),
                filter,
                |other| {
                    current.insert((trigger, other));
                    true
                },
            );
        }

        let order = |handle: &ColliderHandle| {
            self.triggers
                .iter()
                .position(|t| t == handle)
                .unwrap_or(usize::MAX)
        };
        let mut entered: Vec<_> = current.difference(&self.overlaps).copied().collect();
        let mut exited: Vec<_> = self.overlaps.difference(&current).copied().collect();
        entered.sort_by_key(|(trigger, other)| (order(trigger), other.into_raw_parts()));
        exited.sort_by_key(|(trigger, other)| (order(trigger), other.into_raw_parts()));

        let mut events = Vec::with_capacity(entered.len() + exited.len());
        for (kind, pairs) in [
            (TriggerEventKind::Enter, entered),
            (TriggerEventKind::Exit, exited),
        ] {
            for (trigger, other) in pairs {
                let layer = self
                    .collider_set
                    .get(other)
                    .and_then(|c| Layer::from_group(c.collision_groups().memberships))
                    .unwrap_or(Layer::Default);
                events.push(TriggerEvent {
                    kind,
                    trigger,
                    other,
                    layer,
                });
            }
        }

        self.overlaps = current;
        events
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::NEG_Y * crate::config::GRAVITY)
    }
}
