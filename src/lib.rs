pub mod api;
pub mod bridge;
pub mod components;
pub mod core;
pub mod game;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::game::{EngineContext, Game, GameConfig, GameRunner};
pub use api::types::EntityId;
pub use bridge::hud::HudSnapshot;
pub use components::entity::Entity;
pub use crate::core::physics::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld,
};
pub use crate::core::rng::Rng;
pub use crate::core::scene::Scene;
pub use crate::core::time::{FixedTimestep, SimClock};
pub use game::course::{CourseConfig, CourseGame};
pub use game::level::{BlockKind, BlockSpec, LevelCache, LevelSpec, BLOCK_SPACING, DEFAULT_PALETTE};
pub use game::motion::{
    block_target, limbo_height, slider_offset, spinner_rotation, MotionTarget,
};
pub use game::player::{CameraRig, PlayerController};
pub use game::store::{GameStore, Phase, RunSnapshot, SubscriptionId};
pub use game::world::{CourseWorld, ObstacleInstance};
pub use input::state::{InputFrame, InputState, InputTracker};
