use glam::Vec3;

use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::physics::{BodyDesc, ColliderMaterial, PhysicsWorld};
use crate::core::scene::Scene;
use crate::core::time::{FixedTimestep, SimClock};
use crate::input::state::{InputFrame, InputState, InputTracker};

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Gravity vector for physics simulation (Y-up; default: Earth-ish).
    pub gravity: Vec3,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

/// The core contract every game must fulfill.
///
/// Per fixed step the runner calls `update` (command kinematic poses, apply
/// impulses), steps the physics, then calls `post_step` (read the settled
/// poses, run win/lose checks). Split this way so controllers always observe
/// post-step state.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The pre-step tick: apply forces, command obstacle poses.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputFrame);

    /// The post-step tick: read settled poses, evaluate transitions.
    fn post_step(&mut self, _ctx: &mut EngineContext, _input: &InputFrame) {}
}

/// Mutable access to engine state, passed to Game::init and the tick hooks.
pub struct EngineContext {
    pub scene: Scene,
    pub physics: PhysicsWorld,
    clock: SimClock,
    dt: f32,
    next_id: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    pub fn with_config(config: &GameConfig) -> Self {
        let mut physics = PhysicsWorld::new(config.gravity);
        physics.set_dt(config.fixed_dt);
        Self {
            scene: Scene::new(),
            physics,
            clock: SimClock::new(),
            dt: config.fixed_dt,
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Seconds simulated per fixed step.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Total simulated seconds since the session started.
    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    /// Current timestamp in milliseconds on the simulation clock.
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Spawn an entity with a physics body. Returns the EntityId.
    /// The entity's position is set from the BodyDesc.
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity.with_body(body).with_pos(desc.position);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    pub fn despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.despawn(id) {
            if let Some(body) = &entity.body {
                self.physics.remove_body(body);
            }
        }
    }

    /// Advance the clock, step the physics, and sync body poses back to
    /// entities. Called by the runner once per fixed step.
    pub fn step_physics(&mut self) {
        self.clock.advance(self.dt);
        self.physics.step();

        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                let (pos, rot) = self.physics.body_pose(body);
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Headless fixed-timestep driver.
///
/// Single-threaded cooperative loop: the host calls `advance` with the wall
/// frame delta and the current input state; the runner converts that into
/// zero or more fixed steps, each running update → physics step → post_step
/// in strict order.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    timestep: FixedTimestep,
    tracker: InputTracker,
}

impl<G: Game> GameRunner<G> {
    pub fn new(mut game: G) -> Self {
        let config = game.config();
        let mut ctx = EngineContext::with_config(&config);
        game.init(&mut ctx);
        Self {
            game,
            ctx,
            timestep: FixedTimestep::new(config.fixed_dt),
            tracker: InputTracker::new(),
        }
    }

    /// Feed a variable frame delta; runs however many fixed steps fit.
    /// Returns the number of steps executed.
    pub fn advance(&mut self, frame_dt: f32, input: InputState) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.run_step(input);
        }
        steps
    }

    /// Run exactly one fixed step. Convenient for tests and lockstep hosts.
    pub fn step(&mut self, input: InputState) {
        self.run_step(input);
    }

    fn run_step(&mut self, input: InputState) {
        let frame = self.tracker.frame(input);
        self.game.update(&mut self.ctx, &frame);
        self.ctx.step_physics();
        self.game.post_step(&mut self.ctx, &frame);
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn ctx(&self) -> &EngineContext {
        &self.ctx
    }
}
