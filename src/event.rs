use std::cell::RefCell;

/// Lifecycle signals emitted by the cropper UI. Fire-and-forget, no payload:
/// subscribers read the session's current geometry on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropperEvent {
    /// The user accepted the current edit.
    Confirmed,
    /// The user discarded the current edit.
    Canceled,
}

pub trait EventHandler {
    fn handle_event(&mut self, event: &CropperEvent);
}

/// A simple event bus broadcasting cropper events to registered handlers.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "handlers",
                &format!("<{} handlers>", self.handlers.borrow().len()),
            )
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Emit an event to all registered handlers.
    pub fn emit(&self, event: CropperEvent) {
        for handler in &mut *self.handlers.borrow_mut() {
            handler.handle_event(&event);
        }
    }
}
