//! Logical input boundary.
//!
//! The platform layer (keyboard, gamepad, touch overlay) is expected to
//! resolve raw events into the pressed state of five logical controls and
//! hand that state to the runner once per frame. Edge detection between
//! consecutive fixed steps happens here, so game code can react to a press
//! exactly once even when the key is held.

/// Current pressed state of the five logical controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub leftward: bool,
    pub rightward: bool,
    pub jump: bool,
}

impl InputState {
    /// Whether any control is active.
    pub fn any_active(&self) -> bool {
        self.forward || self.backward || self.leftward || self.rightward || self.jump
    }
}

/// Per-tick input view handed to the game: the held state plus the controls
/// that transitioned this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFrame {
    /// Controls currently held down.
    pub held: InputState,
    /// Controls that went inactive → active this tick (rising edges).
    pub pressed: InputState,
    /// Controls that went active → inactive this tick (falling edges).
    pub released: InputState,
}

impl InputFrame {
    /// Any activity at all this tick: something held or something changed.
    pub fn any_activity(&self) -> bool {
        self.held.any_active() || self.pressed.any_active() || self.released.any_active()
    }
}

/// Tracks input state across ticks and derives edges.
#[derive(Debug, Default)]
pub struct InputTracker {
    prev: InputState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the previous tick's state and produce the frame view.
    pub fn frame(&mut self, current: InputState) -> InputFrame {
        let edge = |now: bool, before: bool| now && !before;
        let drop = |now: bool, before: bool| !now && before;
        let frame = InputFrame {
            held: current,
            pressed: InputState {
                forward: edge(current.forward, self.prev.forward),
                backward: edge(current.backward, self.prev.backward),
                leftward: edge(current.leftward, self.prev.leftward),
                rightward: edge(current.rightward, self.prev.rightward),
                jump: edge(current.jump, self.prev.jump),
            },
            released: InputState {
                forward: drop(current.forward, self.prev.forward),
                backward: drop(current.backward, self.prev.backward),
                leftward: drop(current.leftward, self.prev.leftward),
                rightward: drop(current.rightward, self.prev.rightward),
                jump: drop(current.jump, self.prev.jump),
            },
        };
        self.prev = current;
        frame
    }
}
