//! The obstacle race game: wires the run store, the course world and the
//! avatar controller into the engine's tick contract.
//!
//! Per fixed step:
//!   update:    deferred restart → phase-change reactions → any-key start →
//!              course sync → obstacle drive → avatar control
//!   post_step: camera follow, finish and fall checks on settled poses

use serde::{Deserialize, Serialize};

use crate::api::game::{EngineContext, Game};
use crate::bridge::hud::HudSnapshot;
use crate::core::rng::Rng;
use crate::game::level::{BlockKind, BLOCK_SPACING, DEFAULT_PALETTE};
use crate::game::player::PlayerController;
use crate::game::store::{GameStore, Phase};
use crate::game::world::CourseWorld;
use crate::input::state::InputFrame;

/// Host-facing configuration, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Number of obstacle blocks per level.
    pub block_count: u32,
    /// Obstacle kinds eligible for generation.
    pub palette: Vec<BlockKind>,
    /// Session seed; `None` seeds from the system clock.
    pub seed: Option<u64>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            block_count: 10,
            palette: DEFAULT_PALETTE.to_vec(),
            seed: None,
        }
    }
}

impl CourseConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The complete game. Implements [`Game`] so it runs under `GameRunner`.
pub struct CourseGame {
    store: GameStore,
    world: CourseWorld,
    player: PlayerController,
    last_phase: Phase,
    pending_restart: bool,
}

impl CourseGame {
    pub fn new(config: CourseConfig) -> Self {
        let session_seed = config
            .seed
            .unwrap_or_else(|| Rng::from_entropy().next_u64());
        let store = GameStore::new(config.block_count, session_seed);
        let world = CourseWorld::new(config.palette);
        Self {
            store,
            world,
            player: PlayerController::new(),
            last_phase: Phase::Ready,
            pending_restart: false,
        }
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GameStore {
        &mut self.store
    }

    pub fn world(&self) -> &CourseWorld {
        &self.world
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    /// Queue a restart (the HUD's restart button); applied at the start of
    /// the next tick so it never races the physics step.
    pub fn request_restart(&mut self) {
        self.pending_restart = true;
    }

    /// Snapshot the presentation state for the HUD overlay.
    pub fn hud(&self, ctx: &EngineContext) -> HudSnapshot {
        HudSnapshot::capture(&self.store, ctx.now_ms())
    }

    fn finish_line(&self) -> f32 {
        -(self.store.blocks_count() as f32 * BLOCK_SPACING + 2.0)
    }
}

impl Game for CourseGame {
    fn init(&mut self, ctx: &mut EngineContext) {
        self.world
            .sync(ctx, self.store.blocks_count(), self.store.block_seed());
        self.player.spawn(ctx);
        self.last_phase = self.store.phase();
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputFrame) {
        if self.pending_restart {
            self.pending_restart = false;
            self.store.restart();
        }

        // React to transitions made last tick (or just above): a return to
        // Ready puts the marble back on the start pad.
        let phase = self.store.phase();
        if phase != self.last_phase {
            if phase == Phase::Ready {
                self.player.reset(ctx);
            }
            self.last_phase = phase;
        }

        // Any control activity arms the run. Guarded, so held keys during
        // Playing or Ended are harmless.
        if input.any_activity() {
            self.store.start(ctx.now_ms());
        }

        self.world
            .sync(ctx, self.store.blocks_count(), self.store.block_seed());
        self.world.drive(ctx);
        self.player.control(ctx, input);
    }

    fn post_step(&mut self, ctx: &mut EngineContext, _input: &InputFrame) {
        let finish = self.finish_line();
        self.player.after_step(ctx, &mut self.store, finish);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::game::GameRunner;
    use crate::game::player::SPAWN_POSITION;
    use crate::input::state::{InputState, InputTracker};
    use glam::Vec3;

    /// Obstacle-free course so runs are deterministic under gravity and
    /// forward impulses alone.
    fn short_config() -> CourseConfig {
        CourseConfig {
            block_count: 0,
            seed: Some(9),
            ..Default::default()
        }
    }

    fn forward() -> InputState {
        InputState {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn boots_ready_with_course_and_marble() {
        let runner = GameRunner::new(CourseGame::new(CourseConfig {
            block_count: 3,
            seed: Some(1),
            ..Default::default()
        }));
        let game = runner.game();
        assert_eq!(game.store().phase(), Phase::Ready);
        assert_eq!(game.world().obstacles().len(), 3);
        assert!(runner.ctx().scene.find_by_tag("player").is_some());
    }

    #[test]
    fn full_run_to_the_finish() {
        let mut runner = GameRunner::new(CourseGame::new(short_config()));
        assert_eq!(runner.game().store().phase(), Phase::Ready);

        // First input starts the clock.
        runner.step(forward());
        assert_eq!(runner.game().store().phase(), Phase::Playing);

        // Hold forward until the marble crosses the finish line.
        let mut steps = 0;
        while runner.game().store().phase() == Phase::Playing && steps < 2000 {
            runner.step(forward());
            steps += 1;
        }
        assert_eq!(runner.game().store().phase(), Phase::Ended);
        assert!(steps > 10, "finish should take some simulated time");

        // The final time is frozen.
        let now = runner.ctx().now_ms();
        let final_ms = runner.game().store().elapsed_ms(now);
        assert!(final_ms > 0.0);
        for _ in 0..30 {
            runner.step(InputState::default());
        }
        let later = runner.ctx().now_ms();
        assert_eq!(runner.game().store().elapsed_ms(later), final_ms);
    }

    #[test]
    fn falling_off_the_course_resets_with_a_fresh_level() {
        let mut game = CourseGame::new(short_config());
        let mut ctx = EngineContext::with_config(&game.config());
        game.init(&mut ctx);
        let mut tracker = InputTracker::new();

        let frame = tracker.frame(forward());
        game.update(&mut ctx, &frame);
        ctx.step_physics();
        game.post_step(&mut ctx, &frame);
        assert_eq!(game.store().phase(), Phase::Playing);

        let seed_before = game.store().block_seed();
        let body = *game.player().body().unwrap();
        // Off the side of the course; nothing below, so the marble falls.
        ctx.physics.set_position(&body, Vec3::new(10.0, 1.0, 0.0));
        ctx.physics.set_velocity(&body, Vec3::ZERO);

        let idle = tracker.frame(InputState::default());
        let mut steps = 0;
        while game.store().phase() == Phase::Playing && steps < 600 {
            game.update(&mut ctx, &idle);
            ctx.step_physics();
            game.post_step(&mut ctx, &idle);
            steps += 1;
        }

        assert_eq!(game.store().phase(), Phase::Ready);
        assert_ne!(game.store().block_seed(), seed_before);
        assert_eq!(game.store().blocks_count(), 0);

        // The tick after the reset puts the marble back on the start pad.
        game.update(&mut ctx, &tracker.frame(InputState::default()));
        let pos = ctx.physics.body_translation(&body);
        assert!((pos - SPAWN_POSITION).length() < 1e-3, "pos={:?}", pos);
    }

    #[test]
    fn requested_restart_applies_next_tick() {
        let mut runner = GameRunner::new(CourseGame::new(short_config()));
        runner.step(forward());
        assert_eq!(runner.game().store().phase(), Phase::Playing);
        let seed_before = runner.game().store().block_seed();

        runner.game_mut().request_restart();
        runner.step(InputState::default());
        assert_eq!(runner.game().store().phase(), Phase::Ready);
        assert_ne!(runner.game().store().block_seed(), seed_before);
    }

    #[test]
    fn restart_while_ready_changes_nothing() {
        let mut runner = GameRunner::new(CourseGame::new(short_config()));
        let seed = runner.game().store().block_seed();
        runner.game_mut().request_restart();
        runner.step(InputState::default());
        assert_eq!(runner.game().store().phase(), Phase::Ready);
        assert_eq!(runner.game().store().block_seed(), seed);
    }

    #[test]
    fn config_round_trips_json() {
        let config = CourseConfig::from_json(
            r#"{"block_count": 4, "palette": ["limbo", "slider"], "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(config.block_count, 4);
        assert_eq!(config.palette, vec![BlockKind::Limbo, BlockKind::Slider]);
        assert_eq!(config.seed, Some(7));

        // Missing fields fall back to defaults.
        let config = CourseConfig::from_json("{}").unwrap();
        assert_eq!(config.block_count, 10);
        assert_eq!(config.palette, DEFAULT_PALETTE.to_vec());
        assert_eq!(config.seed, None);
    }
}
