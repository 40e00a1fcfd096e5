//! Run state store: the race's macro-state and its controlled mutations.
//!
//! A single process-scoped store shared by the avatar controller, the level
//! composition and the HUD. All mutation goes through the three guarded
//! transitions; observers register push listeners with a selector so they
//! only hear about the changes they care about.

use serde::{Deserialize, Serialize};

use crate::core::rng::Rng;

/// The race's macro-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Ready,
    Playing,
    Ended,
}

/// Value snapshot pushed to listeners on every effective transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSnapshot {
    pub phase: Phase,
    pub blocks_count: u32,
    pub block_seed: u64,
}

/// Listener registration handle; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u32);

struct Listener {
    id: SubscriptionId,
    callback: Box<dyn FnMut(&RunSnapshot)>,
}

/// The run store.
///
/// Timestamps are milliseconds on the simulation clock (an arbitrary
/// monotonic epoch). Transitions are idempotent guards: calling one from the
/// wrong phase changes nothing, so independent triggers (any-key start, the
/// fall check, the HUD restart button) can all fire safely.
pub struct GameStore {
    phase: Phase,
    start_time: Option<f64>,
    end_time: Option<f64>,
    blocks_count: u32,
    block_seed: u64,
    seed_source: Rng,
    listeners: Vec<Listener>,
    next_subscription: u32,
}

impl GameStore {
    /// Create a store with the given obstacle count, seeding the level seed
    /// stream from `initial_seed` so whole sessions can be replayed.
    pub fn new(blocks_count: u32, initial_seed: u64) -> Self {
        let mut seed_source = Rng::new(initial_seed);
        let block_seed = seed_source.next_u64();
        Self {
            phase: Phase::Ready,
            start_time: None,
            end_time: None,
            blocks_count,
            block_seed,
            seed_source,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // -- Accessors (presentation boundary) --

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn blocks_count(&self) -> u32 {
        self.blocks_count
    }

    pub fn block_seed(&self) -> u64 {
        self.block_seed
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            phase: self.phase,
            blocks_count: self.blocks_count,
            block_seed: self.block_seed,
        }
    }

    /// Elapsed race time in milliseconds at `now_ms`.
    ///
    /// Recomputed by the HUD every frame while Playing; frozen at the final
    /// time once Ended; zero while Ready.
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        match (self.phase, self.start_time, self.end_time) {
            (Phase::Playing, Some(start), _) => now_ms - start,
            (Phase::Ended, Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    // -- Transitions --

    /// Ready → Playing. No-op from any other phase.
    pub fn start(&mut self, now_ms: f64) {
        if self.phase != Phase::Ready {
            return;
        }
        self.phase = Phase::Playing;
        self.start_time = Some(now_ms);
        log::info!("run started at {:.0}ms", now_ms);
        self.notify();
    }

    /// Playing → Ended. No-op from any other phase.
    pub fn end(&mut self, now_ms: f64) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::Ended;
        self.end_time = Some(now_ms);
        log::info!(
            "run ended, final time {:.2}s",
            self.elapsed_ms(now_ms) / 1000.0
        );
        self.notify();
    }

    /// {Playing, Ended} → Ready, drawing a fresh level seed. No-op from Ready.
    pub fn restart(&mut self) {
        if self.phase == Phase::Ready {
            return;
        }
        self.phase = Phase::Ready;
        self.block_seed = self.seed_source.next_u64();
        log::info!("run reset, new level seed {:#x}", self.block_seed);
        self.notify();
    }

    // -- Subscriptions --

    /// Register a listener invoked after every effective transition.
    pub fn subscribe(&mut self, callback: Box<dyn FnMut(&RunSnapshot)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push(Listener { id, callback });
        id
    }

    /// Register a listener on a selected slice of the state. The callback
    /// only fires when the selected value actually changes.
    pub fn subscribe_with<T, S, F>(&mut self, selector: S, mut callback: F) -> SubscriptionId
    where
        T: PartialEq + Clone + 'static,
        S: Fn(&RunSnapshot) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        let mut last = selector(&self.snapshot());
        self.subscribe(Box::new(move |snapshot| {
            let value = selector(snapshot);
            if value != last {
                callback(&value);
                last = value;
            }
        }))
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|l| l.id != id);
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        // Listeners are moved out for the duration of the calls so a
        // callback can register new subscriptions without aliasing.
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            (listener.callback)(&snapshot);
        }
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }
}
