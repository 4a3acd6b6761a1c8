//! Listener registry and synchronous message dispatch.

use crate::frame::Message;

// =============================================================================
// MessageListener Trait
// =============================================================================

/// Receives every completed SeaTalk message.
///
/// Listeners decide for themselves whether a message is of interest; the
/// dispatcher does no filtering. The payload is borrowed immutably, so no
/// listener can change what the next one sees.
pub trait MessageListener {
    fn on_message(&mut self, command: u8, payload: &[u8]);
}

impl<F> MessageListener for F
where
    F: FnMut(u8, &[u8]),
{
    fn on_message(&mut self, command: u8, payload: &[u8]) {
        self(command, payload)
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Ordered set of listeners.
///
/// Register everything during setup, then only call [`dispatch`].
/// Listeners must be `Send` so the dispatcher can move into the task that
/// owns the byte stream.
///
/// [`dispatch`]: Dispatcher::dispatch
#[derive(Default)]
pub struct Dispatcher {
    listeners: Vec<Box<dyn MessageListener + Send>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; it will be called after all earlier ones
    pub fn register<L>(&mut self, listener: L)
    where
        L: MessageListener + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Call every listener in registration order.
    ///
    /// A panicking listener is not caught.
    pub fn dispatch(&mut self, message: &Message) {
        for listener in self.listeners.iter_mut() {
            listener.on_message(message.command(), message.payload());
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
