//! Edge detection between consecutive chords.

use crate::keys::Scancode;

/// Keys that went from up to down between `prev` and `new`.
pub const fn pressed(prev: Scancode, new: Scancode) -> Scancode {
    new.difference(prev.intersection(new))
}

/// Keys that went from down to up between `prev` and `new`.
pub const fn released(prev: Scancode, new: Scancode) -> Scancode {
    prev.difference(prev.intersection(new))
}

/// The edges found by a single commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub pressed: Scancode,
    pub released: Scancode,
}

/// Holds the committed chord.
#[derive(Debug)]
pub struct StateTracker {
    state: Scancode,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    /// Starts with no key held.
    pub const fn new() -> Self {
        Self {
            state: Scancode::empty(),
        }
    }

    /// The last committed chord.
    pub fn state(&self) -> Scancode {
        self.state
    }

    /// Commits `new` and returns what changed, or `None` when nothing did.
    pub fn commit(&mut self, new: Scancode) -> Option<Delta> {
        if new == self.state {
            return None;
        }
        let delta = Delta {
            pressed: pressed(self.state, new),
            released: released(self.state, new),
        };
        self.state = new;
        Some(delta)
    }

    /// Forgets every held key.
    pub fn reset(&mut self) {
        self.state = Scancode::empty();
    }
}
