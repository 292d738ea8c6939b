//! Module for delivering pointer input to viewers
//!
//! The hub owns the registration of every handler. A subscription is released when its
//! `InputSubscription` guard is dropped, so a viewer never outlives its input wiring.

use crate::geometry::Point;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Where a pointer release was observed
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerSource {
    /// On the viewer surface
    Surface,
    /// Anywhere in the window, possibly outside the viewer
    Window,
}

/// An input event, with positions in screen coordinates
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(PointerSource),
    /// The pointer left the viewer surface
    PointerLeave,
    /// `delta_y` < 0 scrolls up (zoom in)
    Wheel { position: Point, delta_y: f64 },
    /// Display refresh tick
    Frame,
}

type Handler = Rc<RefCell<dyn FnMut(&InputEvent)>>;
type Handlers = Vec<(u64, Handler)>;

/// Dispatcher of input events to subscribed handlers
#[derive(Default)]
pub struct InputHub {
    handlers: Rc<RefCell<Handlers>>,
    next_id: RefCell<u64>,
}

/// Registration of a handler on an `InputHub`
/// The handler is removed when this is dropped
#[must_use = "the handler is unsubscribed when the subscription is dropped"]
pub struct InputSubscription {
    handlers: Weak<RefCell<Handlers>>,
    id: u64,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl FnMut(&InputEvent) + 'static) -> InputSubscription {
        let id = {
            let mut next_id = self.next_id.borrow_mut();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let handler: Handler = Rc::new(RefCell::new(handler));
        self.handlers.borrow_mut().push((id, handler));

        log::debug!("Input handler {} subscribed", id);

        InputSubscription {
            handlers: Rc::downgrade(&self.handlers),
            id,
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Deliver an event to every handler
    /// Handlers may subscribe or unsubscribe while the event is delivered
    pub fn dispatch(&self, event: InputEvent) {
        let handlers: Vec<Handler> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(&event),
                Err(_) => log::warn!("Dropped re-entrant input event {:?}", event),
            }
        }
    }
}

impl InputSubscription {
    /// Whether the hub is still alive and holds the handler
    pub fn is_active(&self) -> bool {
        self.handlers
            .upgrade()
            .map_or(false, |handlers| handlers.borrow().iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for InputSubscription {
    fn drop(&mut self) {
        if let Some(handlers) = self.handlers.upgrade() {
            handlers.borrow_mut().retain(|(id, _)| *id != self.id);

            log::debug!("Input handler {} unsubscribed", self.id);
        }
    }
}
