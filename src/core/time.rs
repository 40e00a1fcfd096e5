/// Fixed timestep accumulator.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Simulation clock: total simulated time advanced by the fixed-step loop.
///
/// This is the monotonic epoch every timestamp in the run store refers to.
/// It advances only when a fixed step runs, so pausing the outer loop pauses
/// the race timer with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    elapsed: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self { elapsed: 0.0 }
    }

    /// Advance the clock by one fixed step.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt as f64;
    }

    /// Total simulated seconds since the clock was created.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Total simulated milliseconds since the clock was created.
    pub fn now_ms(&self) -> f64 {
        self.elapsed * 1000.0
    }
}
