use crate::error::Error;

/// An asynchronous notification pushed by the server (`NOTIFY`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub payload: String,
    /// Process id of the notifying server backend
    pub process_id: i32,
}

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

pub type NotificationHandler = Box<dyn FnMut(&Notification) + Send>;
pub type ErrorHandler = Box<dyn FnMut(&Error) + Send>;

/// Subscribers of one event kind, in registration order
pub(crate) struct Subscribers<H> {
    handlers: Vec<(SubscriptionId, H)>,
}

impl<H> Default for Subscribers<H> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<H> Subscribers<H> {
    pub(crate) fn push(&mut self, id: SubscriptionId, handler: H) {
        self.handlers.push((id, handler));
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn handlers_mut(&mut self) -> impl Iterator<Item = &mut H> {
        self.handlers.iter_mut().map(|(_, handler)| handler)
    }
}
