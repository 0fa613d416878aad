//! Screen-space state the host renderer reads: the black fade overlay and the
//! vertical look-angle bar.

use crate::config::MAX_PITCH;
use crate::math::lerp;
use crate::Progress;

/// Opacity of the full-screen black image.
#[derive(Clone, Debug, PartialEq)]
pub struct FadeOverlay {
    pub appear_time: f32,
    alpha: f32,
}

impl FadeOverlay {
    pub fn new(appear_time: f32) -> Self {
        Self {
            appear_time,
            alpha: 0.0,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Fade toward opaque.
    pub fn appear(&self) -> Fade {
        Fade::new(1.0, self.appear_time)
    }

    /// Fade toward transparent.
    pub fn faint(&self) -> Fade {
        Fade::new(0.0, self.appear_time)
    }
}

/// One fade of the overlay toward a target opacity, advanced once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    target: f32,
    duration: f32,
    elapsed: f32,
    done: bool,
}

impl Fade {
    pub fn new(target: f32, duration: f32) -> Self {
        Self {
            target,
            duration,
            elapsed: 0.0,
            done: false,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Each frame moves alpha by `lerp(alpha, target, elapsed / duration)`; once the
    /// duration has passed alpha snaps to exactly the target.
    pub fn advance(&mut self, overlay: &mut FadeOverlay, dt: f32) -> Progress {
        if self.done {
            return Progress::Done;
        }
        if self.duration <= 0.0 {
            overlay.alpha = self.target;
            self.done = true;
            return Progress::Done;
        }
        self.elapsed += dt;
        overlay.alpha = lerp(overlay.alpha, self.target, self.elapsed / self.duration);
        if self.elapsed >= self.duration {
            overlay.alpha = self.target;
            self.done = true;
            return Progress::Done;
        }
        Progress::InProgress
    }
}

/// Vertical bar showing the target pitch; `bottom` is the bar height in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleIndicator {
    pub top: f32,
    pub bottom: f32,
}

impl AngleIndicator {
    pub fn new(bar_height: f32) -> Self {
        Self {
            top: 0.0,
            bottom: bar_height,
        }
    }

    /// Marker offset: looking straight down sits at the bottom, straight up at the top.
    pub fn offset(&self, target_pitch: f32) -> f32 {
        let angle = target_pitch + MAX_PITCH;
        lerp(self.bottom, self.top, angle / (2.0 * MAX_PITCH))
    }
}
