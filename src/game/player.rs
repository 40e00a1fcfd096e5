//! Avatar controller: the player-driven marble plus its chase camera.
//!
//! The marble is a dynamic rigid body; all control is impulses and torque
//! impulses, so collisions and damping behave consistently with everything
//! else in the simulation. The controller never touches the run store except
//! through its guarded transitions.

use glam::Vec3;

use crate::api::game::EngineContext;
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsBody};
use crate::game::store::GameStore;
use crate::input::state::InputFrame;

pub const BALL_RADIUS: f32 = 0.3;
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Impulse per second of held directional input.
pub const IMPULSE_STRENGTH: f32 = 0.6;
/// Torque impulse per second of held directional input.
pub const TORQUE_STRENGTH: f32 = 0.2;
/// Instantaneous upward impulse applied on a grounded jump.
pub const JUMP_IMPULSE: f32 = 0.5;

/// The grounded ray starts just under the marble's center.
const JUMP_RAY_OFFSET: f32 = 0.31;
const JUMP_RAY_MAX: f32 = 10.0;
/// Below this time of impact the marble counts as grounded.
const GROUND_TOI: f32 = 0.15;

/// Falling below this height aborts the run.
pub const FALL_LIMIT: f32 = -4.0;

const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 0.65, 3.0);
const CAMERA_TARGET_OFFSET: Vec3 = Vec3::new(0.0, 0.25, 0.0);
const CAMERA_SMOOTHING: f32 = 5.0;

/// Smoothed chase camera. Pure state, no physics involvement; a renderer
/// reads `position` and `target` directly.
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            // Start far out so the opening frames sweep in toward the marble.
            position: Vec3::new(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
        }
    }

    /// Move toward the ideal pose behind and above `focus`, converging
    /// exponentially. `delta` is the step time in seconds.
    pub fn follow(&mut self, focus: Vec3, delta: f32) {
        let alpha = (CAMERA_SMOOTHING * delta).min(1.0);
        self.position = self.position.lerp(focus + CAMERA_OFFSET, alpha);
        self.target = self.target.lerp(focus + CAMERA_TARGET_OFFSET, alpha);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the marble from input frames and watches for finish and fall.
pub struct PlayerController {
    body: Option<PhysicsBody>,
    entity: Option<EntityId>,
    pub camera: CameraRig,
}

impl PlayerController {
    pub fn new() -> Self {
        Self {
            body: None,
            entity: None,
            camera: CameraRig::new(),
        }
    }

    pub fn body(&self) -> Option<&PhysicsBody> {
        self.body.as_ref()
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Spawn the marble at the start pad. Idempotent: a second call while a
    /// marble exists is ignored.
    pub fn spawn(&mut self, ctx: &mut EngineContext) {
        if self.body.is_some() {
            return;
        }
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball {
            radius: BALL_RADIUS,
        })
        .with_position(SPAWN_POSITION)
        .with_linear_damping(0.5)
        .with_angular_damping(0.5)
        .with_can_sleep(false);
        ctx.spawn_with_body(
            Entity::new(id).with_tag("player"),
            desc,
            ColliderMaterial {
                restitution: 0.2,
                friction: 1.0,
                density: 1.0,
            },
        );
        self.body = ctx.scene.get(id).and_then(|e| e.body);
        self.entity = Some(id);
        log::debug!("player spawned at {:?}", SPAWN_POSITION);
    }

    /// Teleport the marble back to the start pad and zero its velocities.
    /// No-op before `spawn`.
    pub fn reset(&mut self, ctx: &mut EngineContext) {
        if let Some(body) = &self.body {
            ctx.physics.set_position(body, SPAWN_POSITION);
            ctx.physics.set_velocity(body, Vec3::ZERO);
            ctx.physics.set_angular_velocity(body, Vec3::ZERO);
        }
    }

    /// Pre-step control: accumulate all held directions into one impulse and
    /// one torque impulse, then apply each once. Jump fires on the press
    /// edge only, and only when grounded.
    pub fn control(&mut self, ctx: &mut EngineContext, frame: &InputFrame) {
        let Some(body) = self.body else {
            return;
        };
        let delta = ctx.dt();

        let mut impulse = Vec3::ZERO;
        let mut torque = Vec3::ZERO;
        let linear = IMPULSE_STRENGTH * delta;
        let angular = TORQUE_STRENGTH * delta;

        if frame.held.forward {
            impulse.z -= linear;
            torque.x -= angular;
        }
        if frame.held.backward {
            impulse.z += linear;
            torque.x += angular;
        }
        if frame.held.leftward {
            impulse.x -= linear;
            torque.z += angular;
        }
        if frame.held.rightward {
            impulse.x += linear;
            torque.z -= angular;
        }

        if impulse != Vec3::ZERO {
            ctx.physics.apply_impulse(&body, impulse);
        }
        if torque != Vec3::ZERO {
            ctx.physics.apply_torque_impulse(&body, torque);
        }

        if frame.pressed.jump && self.is_grounded(ctx, &body) {
            ctx.physics.apply_impulse(&body, Vec3::new(0.0, JUMP_IMPULSE, 0.0));
        }
    }

    /// Post-step observation: follow with the camera and run the finish and
    /// fall checks against the settled pose. `finish_line` is the Z
    /// coordinate crossing which ends the run.
    pub fn after_step(&mut self, ctx: &mut EngineContext, store: &mut GameStore, finish_line: f32) {
        let Some(body) = self.body else {
            return;
        };
        let pos = ctx.physics.body_translation(&body);
        self.camera.follow(pos, ctx.dt());

        if pos.z < finish_line {
            store.end(ctx.now_ms());
        }
        if pos.y < FALL_LIMIT {
            store.restart();
        }
    }

    fn is_grounded(&self, ctx: &EngineContext, body: &PhysicsBody) -> bool {
        let origin = ctx.physics.body_translation(body) - Vec3::new(0.0, JUMP_RAY_OFFSET, 0.0);
        match ctx
            .physics
            .cast_ray(origin, Vec3::NEG_Y, JUMP_RAY_MAX, true, Some(body))
        {
            Some(toi) => toi < GROUND_TOI,
            None => false,
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::state::InputState;

    fn context() -> EngineContext {
        EngineContext::new()
    }

    fn spawn_floor(ctx: &mut EngineContext) {
        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
            half_extents: Vec3::new(2.0, 0.1, 8.0),
        })
        .with_position(Vec3::new(0.0, -0.1, 0.0));
        ctx.spawn_with_body(
            Entity::new(id).with_tag("floor"),
            desc,
            ColliderMaterial::default(),
        );
    }

    fn frame_held(held: InputState) -> InputFrame {
        InputFrame {
            held,
            pressed: InputState::default(),
            released: InputState::default(),
        }
    }

    #[test]
    fn camera_converges_on_focus() {
        let mut rig = CameraRig::new();
        let focus = Vec3::new(0.0, 1.0, -8.0);
        for _ in 0..600 {
            rig.follow(focus, 1.0 / 60.0);
        }
        assert!((rig.position - (focus + CAMERA_OFFSET)).length() < 1e-2);
        assert!((rig.target - (focus + CAMERA_TARGET_OFFSET)).length() < 1e-2);
    }

    #[test]
    fn spawn_is_idempotent() {
        let mut ctx = context();
        let mut player = PlayerController::new();
        player.spawn(&mut ctx);
        player.spawn(&mut ctx);
        assert_eq!(ctx.physics.body_count(), 1);
        assert_eq!(ctx.scene.len(), 1);
    }

    #[test]
    fn forward_input_accelerates_down_course() {
        let mut ctx = context();
        spawn_floor(&mut ctx);
        let mut player = PlayerController::new();
        player.spawn(&mut ctx);

        let frame = frame_held(InputState {
            forward: true,
            ..Default::default()
        });
        for _ in 0..30 {
            player.control(&mut ctx, &frame);
            ctx.step_physics();
        }

        let vel = ctx.physics.velocity(player.body().unwrap());
        assert!(vel.z < 0.0, "should move toward -Z: {:?}", vel);
    }

    #[test]
    fn opposing_directions_cancel() {
        let mut ctx = context();
        spawn_floor(&mut ctx);
        let mut player = PlayerController::new();
        player.spawn(&mut ctx);

        let frame = frame_held(InputState {
            forward: true,
            backward: true,
            leftward: true,
            rightward: true,
            ..Default::default()
        });
        for _ in 0..30 {
            player.control(&mut ctx, &frame);
            ctx.step_physics();
        }

        let vel = ctx.physics.velocity(player.body().unwrap());
        assert!(vel.x.abs() < 1e-3 && vel.z.abs() < 1e-3, "vel={:?}", vel);
    }

    #[test]
    fn grounded_jump_fires_once_per_press() {
        let mut ctx = context();
        spawn_floor(&mut ctx);
        let mut player = PlayerController::new();
        player.spawn(&mut ctx);

        // Settle onto the floor so the grounded ray connects.
        for _ in 0..60 {
            ctx.step_physics();
        }
        let settled = ctx.physics.velocity(player.body().unwrap());
        assert!(settled.y.abs() < 0.1, "should be resting: {:?}", settled);

        let press = InputFrame {
            held: InputState {
                jump: true,
                ..Default::default()
            },
            pressed: InputState {
                jump: true,
                ..Default::default()
            },
            released: InputState::default(),
        };
        player.control(&mut ctx, &press);
        let vel = ctx.physics.velocity(player.body().unwrap());
        assert!(vel.y > 1.0, "jump should launch upward: {:?}", vel);
        ctx.step_physics();

        // Held but not re-pressed: no second launch while airborne.
        let hold = frame_held(InputState {
            jump: true,
            ..Default::default()
        });
        let before = ctx.physics.velocity(player.body().unwrap()).y;
        player.control(&mut ctx, &hold);
        let after = ctx.physics.velocity(player.body().unwrap()).y;
        assert!((after - before).abs() < 1e-6);
    }

    #[test]
    fn airborne_press_does_not_jump() {
        let mut ctx = context();
        spawn_floor(&mut ctx);
        let mut player = PlayerController::new();
        player.spawn(&mut ctx);
        // Marble center at y=1.0: ray toi ≈ 0.69, well past the threshold.
        ctx.step_physics();

        let press = InputFrame {
            held: InputState {
                jump: true,
                ..Default::default()
            },
            pressed: InputState {
                jump: true,
                ..Default::default()
            },
            released: InputState::default(),
        };
        let before = ctx.physics.velocity(player.body().unwrap()).y;
        player.control(&mut ctx, &press);
        let after = ctx.physics.velocity(player.body().unwrap()).y;
        assert!((after - before).abs() < 1e-6, "no impulse while airborne");
    }

    #[test]
    fn reset_returns_to_spawn() {
        let mut ctx = context();
        let mut player = PlayerController::new();
        player.spawn(&mut ctx);

        let body = *player.body().unwrap();
        ctx.physics.set_position(&body, Vec3::new(1.0, -3.0, -12.0));
        ctx.physics.set_velocity(&body, Vec3::new(0.0, -5.0, -2.0));

        player.reset(&mut ctx);
        assert_eq!(ctx.physics.body_translation(&body), SPAWN_POSITION);
        assert_eq!(ctx.physics.velocity(&body), Vec3::ZERO);
    }

    #[test]
    fn finish_and_fall_checks_drive_the_store() {
        let mut ctx = context();
        let mut player = PlayerController::new();
        player.spawn(&mut ctx);
        let mut store = GameStore::new(0, 1);
        store.start(0.0);

        let body = *player.body().unwrap();

        // Past the finish line: run ends.
        ctx.physics.set_position(&body, Vec3::new(0.0, 1.0, -3.0));
        player.after_step(&mut ctx, &mut store, -2.0);
        assert_eq!(store.phase(), crate::game::store::Phase::Ended);

        // Fallen out of the world: run resets.
        store.start(0.0); // no-op from Ended
        ctx.physics.set_position(&body, Vec3::new(0.0, -5.0, -3.0));
        player.after_step(&mut ctx, &mut store, -2.0);
        assert_eq!(store.phase(), crate::game::store::Phase::Ready);
    }
}
