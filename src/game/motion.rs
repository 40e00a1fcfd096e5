//! Per-obstacle kinematic motion model.
//!
//! Each kind is a pure function of elapsed simulation time and the
//! instance's fixed random phase, producing the commanded pose for the
//! obstacle's moving collider. The model must be re-evaluated every tick;
//! a stale pose freezes the obstacle. Collision response is entirely the
//! physics engine's job, nothing here touches the avatar.

use glam::{Quat, Vec3};

use crate::game::level::{BlockKind, BlockSpec};

/// Base lift added to the limbo bar's sine wave, keeping it passable.
pub const LIMBO_BASE_LIFT: f32 = 1.15;
/// Lateral travel amplitude of the slider wall.
pub const SLIDER_AMPLITUDE: f32 = 1.25;
/// Resting height of the slider wall above the block base.
pub const SLIDER_HEIGHT: f32 = 0.75;
/// Spawn height of the spinner/limbo bar above the block base.
pub const OBSTACLE_SPAWN_HEIGHT: f32 = 0.3;

/// A commanded kinematic target for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionTarget {
    /// Rotation-only command; the body's translation stays put.
    Rotation(Quat),
    /// Absolute translation command.
    Translation(Vec3),
}

/// Spinner yaw at time `t` for a signed angular speed.
pub fn spinner_rotation(t: f32, speed: f32) -> Quat {
    Quat::from_rotation_y(t * speed)
}

/// Limbo bar height above the block base at time `t`.
pub fn limbo_height(t: f32, phase: f32) -> f32 {
    (t + phase).sin() + LIMBO_BASE_LIFT
}

/// Slider wall lateral offset from the block center at time `t`.
pub fn slider_offset(t: f32, phase: f32) -> f32 {
    (t + phase).sin() * SLIDER_AMPLITUDE
}

/// Evaluate the motion model for a block at simulation time `t`.
pub fn block_target(spec: &BlockSpec, t: f32) -> MotionTarget {
    match spec.kind {
        BlockKind::Spinner => MotionTarget::Rotation(spinner_rotation(t, spec.phase)),
        BlockKind::Limbo => MotionTarget::Translation(
            spec.position + Vec3::new(0.0, limbo_height(t, spec.phase), 0.0),
        ),
        BlockKind::Slider => MotionTarget::Translation(
            spec.position + Vec3::new(slider_offset(t, spec.phase), SLIDER_HEIGHT, 0.0),
        ),
    }
}
