use std::collections::{HashMap, HashSet};

use glam::Vec2;

/// Named analog axes, fed by the host's input bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
    GravityVertical,
}

/// Named buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Jump,
    GravityClockwise,
    GravityCounterClockwise,
    ResetGravity,
}

pub struct InputState {
    axes: HashMap<Axis, f32>,
    held: HashSet<Action>,
    pressed: HashSet<Action>,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            axes: HashMap::new(),
            held: HashSet::new(),
            pressed: HashSet::new(),
            mouse_delta: Vec2::ZERO,
        }
    }

    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        self.axes.insert(axis, value.clamp(-1.0, 1.0));
    }

    pub fn axis(&self, axis: Axis) -> f32 {
        self.axes.get(&axis).copied().unwrap_or(0.0)
    }

    pub fn handle_press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.pressed.insert(action);
        }
    }

    pub fn handle_release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn handle_mouse_move(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.x += dx;
        self.mouse_delta.y += dy;
    }

    pub fn consume_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Pressed since the last `consume_pressed` of this action.
    pub fn consume_pressed(&mut self, action: Action) -> bool {
        self.pressed.remove(&action)
    }

    /// Opposed buttons collapsed to `-1`, `0` or `1`.
    pub fn button_axis(&self, positive: Action, negative: Action) -> f32 {
        match (self.is_held(positive), self.is_held(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
