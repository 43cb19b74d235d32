//! Synchronous press/release handler registry.
//!
//! Handlers run inside the scanning task, in registration order, and receive
//! only the keys that changed. They must return quickly: the next scan does not
//! start until every handler of the current one has returned.

use heapless::Vec;

use crate::keys::Scancode;

/// Maximum number of handlers per event kind.
pub const MAX_HANDLERS: usize = 4;

/// Which edge an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Pressed,
    Released,
}

/// A single edge event: the kind of edge and the keys that took it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: EventKind,
    pub delta: Scancode,
}

/// A registered handler.
pub type Handler<'h> = &'h mut dyn FnMut(Scancode);

/// Returned when a handler list is already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError;

/// Holds the press and release handlers.
#[derive(Default)]
pub struct EventDispatcher<'h> {
    pressed: Vec<Handler<'h>, MAX_HANDLERS>,
    released: Vec<Handler<'h>, MAX_HANDLERS>,
}

impl<'h> EventDispatcher<'h> {
    pub fn new() -> Self {
        Self {
            pressed: Vec::new(),
            released: Vec::new(),
        }
    }

    /// Registers a handler for newly pressed keys.
    pub fn on_pressed(&mut self, handler: Handler<'h>) -> Result<(), CapacityError> {
        self.pressed.push(handler).map_err(|_| CapacityError)
    }

    /// Registers a handler for newly released keys.
    pub fn on_released(&mut self, handler: Handler<'h>) -> Result<(), CapacityError> {
        self.released.push(handler).map_err(|_| CapacityError)
    }

    /// Calls every handler registered for `event.kind`.
    pub fn dispatch(&mut self, event: KeyEvent) {
        let handlers = match event.kind {
            EventKind::Pressed => &mut self.pressed,
            EventKind::Released => &mut self.released,
        };
        for handler in handlers.iter_mut() {
            handler(event.delta);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::{cell::RefCell, vec::Vec};

    #[test]
    fn handlers_only_see_their_own_kind() {
        let seen = RefCell::new(Vec::new());
        let mut on_press =
            |delta: Scancode| seen.borrow_mut().push((EventKind::Pressed, delta));
        let mut on_release =
            |delta: Scancode| seen.borrow_mut().push((EventKind::Released, delta));

        let mut dispatcher = EventDispatcher::new();
        dispatcher.on_pressed(&mut on_press).unwrap();
        dispatcher.on_released(&mut on_release).unwrap();

        dispatcher.dispatch(KeyEvent {
            kind: EventKind::Released,
            delta: Scancode::A,
        });
        dispatcher.dispatch(KeyEvent {
            kind: EventKind::Pressed,
            delta: Scancode::B,
        });
        drop(dispatcher);

        assert_eq!(
            seen.into_inner(),
            [
                (EventKind::Released, Scancode::A),
                (EventKind::Pressed, Scancode::B)
            ]
        );
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let order = RefCell::new(Vec::new());
        let mut first = |_: Scancode| order.borrow_mut().push(1);
        let mut second = |_: Scancode| order.borrow_mut().push(2);

        let mut dispatcher = EventDispatcher::new();
        dispatcher.on_pressed(&mut first).unwrap();
        dispatcher.on_pressed(&mut second).unwrap();
        dispatcher.dispatch(KeyEvent {
            kind: EventKind::Pressed,
            delta: Scancode::Q,
        });
        drop(dispatcher);

        assert_eq!(order.into_inner(), [1, 2]);
    }

    #[test]
    fn registering_past_capacity_fails() {
        let mut handlers: [_; MAX_HANDLERS + 1] = core::array::from_fn(|_| |_: Scancode| {});
        let mut dispatcher = EventDispatcher::new();
        let (last, rest) = handlers.split_last_mut().unwrap();
        for handler in rest {
            dispatcher.on_released(handler).unwrap();
        }
        assert_eq!(dispatcher.on_released(last), Err(CapacityError));
    }
}
