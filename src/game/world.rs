//! Level composition: turns a generated `LevelSpec` into physics bodies and
//! scene entities, and drives the kinematic obstacles every tick.
//!
//! The course owns everything it spawns. When the store's `(count, seed)`
//! key changes it tears the old set down, removing every body and entity it
//! created, before building the new one, so no handle outlives its level.

use glam::{Quat, Vec3};

use crate::api::game::EngineContext;
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsBody};
use crate::game::level::{BlockKind, BlockSpec, LevelCache, LevelSpec, BLOCK_SPACING};
use crate::game::motion::{block_target, MotionTarget, OBSTACLE_SPAWN_HEIGHT};

const RESTITUTION: f32 = 0.2;
const FLOOR_FRICTION: f32 = 1.0;
const OBSTACLE_FRICTION: f32 = 0.0;

const WALL_OFFSET: f32 = 2.15;
const WALL_HALF_HEIGHT: f32 = 0.75;
const WALL_HALF_THICKNESS: f32 = 0.15;

/// Spinner and limbo bar half-extents.
const BAR_HALF_EXTENTS: Vec3 = Vec3::new(1.75, 0.15, 0.15);
/// Slider wall half-extents.
const SLIDER_HALF_EXTENTS: Vec3 = Vec3::new(0.75, 0.75, 0.15);

/// One instantiated obstacle: its generated spec plus live handles.
pub struct ObstacleInstance {
    pub spec: BlockSpec,
    pub body: PhysicsBody,
    pub entity: EntityId,
}

/// The physical course built from the current level spec.
pub struct CourseWorld {
    palette: Vec<BlockKind>,
    cache: LevelCache,
    obstacles: Vec<ObstacleInstance>,
    spawned: Vec<EntityId>,
    built_key: Option<(u32, u64)>,
    builds: u32,
}

impl CourseWorld {
    pub fn new(palette: Vec<BlockKind>) -> Self {
        Self {
            palette,
            cache: LevelCache::new(),
            obstacles: Vec::new(),
            spawned: Vec::new(),
            built_key: None,
            builds: 0,
        }
    }

    /// Rebuild the course if `(count, seed)` changed since the last build.
    pub fn sync(&mut self, ctx: &mut EngineContext, count: u32, seed: u64) {
        if self.built_key == Some((count, seed)) {
            return;
        }
        self.teardown(ctx);
        let spec = self.cache.get(count, seed, &self.palette).clone();
        self.build(ctx, &spec);
        self.built_key = Some((count, seed));
        self.builds += 1;
        log::info!(
            "course built: {} blocks, seed {:#x}, {} bodies",
            count,
            seed,
            ctx.physics.body_count()
        );
    }

    /// Command every obstacle's kinematic target for the current tick.
    /// Must run every simulation tick, before the physics step.
    pub fn drive(&self, ctx: &mut EngineContext) {
        let t = ctx.elapsed_seconds() as f32;
        for obstacle in &self.obstacles {
            match block_target(&obstacle.spec, t) {
                MotionTarget::Rotation(rotation) => {
                    ctx.physics.set_kinematic_rotation(&obstacle.body, rotation);
                }
                MotionTarget::Translation(position) => {
                    ctx.physics.set_kinematic_translation(&obstacle.body, position);
                }
            }
        }
    }

    pub fn obstacles(&self) -> &[ObstacleInstance] {
        &self.obstacles
    }

    /// How many times the course has been (re)built.
    pub fn builds(&self) -> u32 {
        self.builds
    }

    fn teardown(&mut self, ctx: &mut EngineContext) {
        for id in self.spawned.drain(..) {
            ctx.despawn(id);
        }
        self.obstacles.clear();
        self.built_key = None;
    }

    fn build(&mut self, ctx: &mut EngineContext, spec: &LevelSpec) {
        self.spawn_bounds(ctx, spec);
        self.spawn_pads(ctx, spec);
        self.spawn_finish_marker(ctx, spec);
        for block in spec.blocks() {
            self.spawn_obstacle(ctx, block);
        }
    }

    /// Side walls, end wall, and the single floor collider carrying the
    /// whole course (the per-block floors are visual only).
    fn spawn_bounds(&mut self, ctx: &mut EngineContext, spec: &LevelSpec) {
        let length = spec.bounds_length();
        let center_z = -(length * BLOCK_SPACING / 2.0) + 2.0;
        let half_length = length * BLOCK_SPACING / 2.0;

        let floor_material = ColliderMaterial {
            restitution: RESTITUTION,
            friction: FLOOR_FRICTION,
            density: 1.0,
        };
        let wall_material = ColliderMaterial {
            restitution: RESTITUTION,
            friction: OBSTACLE_FRICTION,
            density: 1.0,
        };

        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
            half_extents: Vec3::new(2.0, 0.1, half_length),
        })
        .with_position(Vec3::new(0.0, -0.1, center_z));
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag("floor")
                .with_scale(Vec3::new(4.0, 0.2, length * BLOCK_SPACING)),
            desc,
            floor_material,
        );
        self.spawned.push(id);

        for side in [-1.0f32, 1.0] {
            let id = ctx.next_id();
            let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: Vec3::new(WALL_HALF_THICKNESS, WALL_HALF_HEIGHT, half_length),
            })
            .with_position(Vec3::new(side * WALL_OFFSET, WALL_HALF_HEIGHT, center_z));
            ctx.spawn_with_body(
                Entity::new(id)
                    .with_tag("wall")
                    .with_scale(Vec3::new(0.3, 1.5, length * BLOCK_SPACING)),
                desc,
                wall_material,
            );
            self.spawned.push(id);
        }

        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
            half_extents: Vec3::new(2.0, WALL_HALF_HEIGHT, WALL_HALF_THICKNESS),
        })
        .with_position(Vec3::new(0.0, WALL_HALF_HEIGHT, -(length * BLOCK_SPACING) + 2.0));
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag("end-wall")
                .with_scale(Vec3::new(4.0, 1.5, 0.3)),
            desc,
            wall_material,
        );
        self.spawned.push(id);
    }

    /// Visual-only pads and per-block floor tiles for the renderer.
    fn spawn_pads(&mut self, ctx: &mut EngineContext, spec: &LevelSpec) {
        let pad_scale = Vec3::new(4.0, 0.2, 4.0);

        let id = ctx.next_id();
        ctx.scene.spawn(
            Entity::new(id)
                .with_tag("start-pad")
                .with_pos(spec.start_pad() + Vec3::new(0.0, -0.1, 0.0))
                .with_scale(pad_scale),
        );
        self.spawned.push(id);

        let id = ctx.next_id();
        ctx.scene.spawn(
            Entity::new(id)
                .with_tag("end-pad")
                .with_pos(spec.end_pad() + Vec3::new(0.0, -0.1, 0.0))
                .with_scale(pad_scale),
        );
        self.spawned.push(id);

        for block in spec.blocks() {
            let id = ctx.next_id();
            ctx.scene.spawn(
                Entity::new(id)
                    .with_tag("block-floor")
                    .with_pos(block.position + Vec3::new(0.0, -0.1, 0.0))
                    .with_scale(pad_scale),
            );
            self.spawned.push(id);
        }
    }

    /// The fixed centerpiece on the end pad the avatar can bump into.
    fn spawn_finish_marker(&mut self, ctx: &mut EngineContext, spec: &LevelSpec) {
        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::CylinderY {
            half_height: 0.25,
            radius: 0.5,
        })
        .with_position(spec.end_pad() + Vec3::new(0.0, 0.25, 0.0));
        ctx.spawn_with_body(
            Entity::new(id).with_tag("finish"),
            desc,
            ColliderMaterial {
                restitution: RESTITUTION,
                friction: OBSTACLE_FRICTION,
                density: 1.0,
            },
        );
        self.spawned.push(id);
    }

    fn spawn_obstacle(&mut self, ctx: &mut EngineContext, block: &BlockSpec) {
        let (tag, half_extents) = match block.kind {
            BlockKind::Spinner => ("spinner", BAR_HALF_EXTENTS),
            BlockKind::Limbo => ("limbo", BAR_HALF_EXTENTS),
            BlockKind::Slider => ("slider", SLIDER_HALF_EXTENTS),
        };

        let id = ctx.next_id();
        let desc = BodyDesc::kinematic(ColliderDesc::Cuboid { half_extents })
            .with_position(block.position + Vec3::new(0.0, OBSTACLE_SPAWN_HEIGHT, 0.0));
        let material = ColliderMaterial {
            restitution: RESTITUTION,
            friction: OBSTACLE_FRICTION,
            density: 1.0,
        };
        let body = ctx.physics.create_body(id, &desc, material);
        ctx.scene.spawn(
            Entity::new(id)
                .with_tag(tag)
                .with_pos(desc.position)
                .with_rotation(Quat::IDENTITY)
                .with_scale(half_extents * 2.0)
                .with_body(body),
        );

        self.obstacles.push(ObstacleInstance {
            spec: *block,
            body,
            entity: id,
        });
        self.spawned.push(id);
    }
}
