//! Procedural level generation.
//!
//! A level is an ordered run of obstacle blocks along −Z, one block every
//! `BLOCK_SPACING` units, bracketed by a start pad at the origin and an end
//! pad one spacing unit past the last block. Generation is deterministic
//! per seed: the same `(count, seed, palette)` always yields the same
//! sequence, so runs can be replayed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::rng::Rng;

/// Longitudinal spacing between consecutive blocks, in world units.
pub const BLOCK_SPACING: f32 = 4.0;

/// The available obstacle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// A bar rotating around the vertical axis.
    Spinner,
    /// A bar bobbing up and down; roll under it when it is high.
    Limbo,
    /// A wall sliding side to side.
    Slider,
}

/// The default palette: every kind eligible, in course order of appearance.
pub const DEFAULT_PALETTE: [BlockKind; 3] = [BlockKind::Spinner, BlockKind::Limbo, BlockKind::Slider];

/// One generated obstacle block.
///
/// `phase` is the per-instance random draw, fixed for the instance's
/// lifetime; it decorrelates multiple obstacles of the same kind. Its
/// meaning is kind-specific: for Limbo and Slider it is a time offset in
/// [0, 2π); for Spinner it is the signed angular speed, magnitude in
/// [0.2, 1.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSpec {
    pub kind: BlockKind,
    pub position: Vec3,
    pub phase: f32,
}

/// A generated level: the obstacle sequence plus the derived course layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    blocks: Vec<BlockSpec>,
    count: u32,
    seed: u64,
}

impl LevelSpec {
    /// Generate a level from `(count, seed, palette)`.
    ///
    /// Blocks sit at `z = -(i + 1) * BLOCK_SPACING` with no lateral or
    /// vertical offset; all motion comes from the per-tick motion model,
    /// not from placement.
    pub fn generate(count: u32, seed: u64, palette: &[BlockKind]) -> Self {
        let mut rng = Rng::new(seed);
        let mut blocks = Vec::with_capacity(count as usize);

        if palette.is_empty() && count > 0 {
            log::warn!("level palette is empty; generating a course with no obstacles");
        } else {
            for i in 0..count {
                let kind = palette[rng.next_int(palette.len() as u32) as usize];
                let phase = match kind {
                    BlockKind::Spinner => (rng.next_f32() + 0.2) * rng.next_sign(),
                    BlockKind::Limbo | BlockKind::Slider => rng.next_angle(),
                };
                blocks.push(BlockSpec {
                    kind,
                    position: Vec3::new(0.0, 0.0, -((i + 1) as f32) * BLOCK_SPACING),
                    phase,
                });
            }
        }

        Self {
            blocks,
            count,
            seed,
        }
    }

    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The start pad center (always the origin).
    pub fn start_pad(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// The end pad center, one spacing unit past the last block.
    pub fn end_pad(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -((self.count + 1) as f32) * BLOCK_SPACING)
    }

    /// Crossing below this Z coordinate counts as reaching the finish.
    pub fn finish_line(&self) -> f32 {
        -(self.count as f32 * BLOCK_SPACING + 2.0)
    }

    /// Course length in spacing units, pads included.
    pub fn bounds_length(&self) -> f32 {
        (self.count + 2) as f32
    }
}

/// Memoizes the generated level keyed on `(count, seed)`.
///
/// Reads between state changes return the cached spec, so re-rendering or
/// re-querying mid-run never reshuffles obstacle kinds; only a changed seed
/// (restart) or count regenerates.
#[derive(Default)]
pub struct LevelCache {
    cached: Option<LevelSpec>,
    generations: u32,
}

impl LevelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, count: u32, seed: u64, palette: &[BlockKind]) -> &LevelSpec {
        let stale = match &self.cached {
            Some(spec) => spec.count() != count || spec.seed() != seed,
            None => true,
        };
        if stale {
            self.cached = Some(LevelSpec::generate(count, seed, palette));
            self.generations += 1;
            log::info!(
                "generated level: {} blocks, seed {:#x}",
                count,
                seed
            );
        }
        self.cached
            .get_or_insert_with(|| LevelSpec::generate(count, seed, palette))
    }

    /// How many times a level has been generated (not served from cache).
    pub fn generations(&self) -> u32 {
        self.generations
    }
}
