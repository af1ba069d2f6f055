//! Bulk ownership of event connections.
//!
//! Game states subscribe to several input sources on enter and must drop all
//! of those subscriptions on exit. A [`ConnectionSet`] collects the
//! connections and disconnects them together, either explicitly through
//! [`ConnectionSet::disconnect_all`] or when the set is dropped.

use smallvec::SmallVec;

use crate::events::source::EventConnection;

/// Aggregate of [`EventConnection`]s that are disconnected together.
#[derive(Debug, Default)]
pub struct ConnectionSet {
    connections: SmallVec<[EventConnection; 8]>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a connection.
    pub fn push(&mut self, connection: EventConnection) {
        self.connections.push(connection);
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with(mut self, connection: EventConnection) -> Self {
        self.push(connection);
        self
    }

    /// Disconnect and forget every held connection.
    pub fn disconnect_all(&mut self) {
        for connection in self.connections.drain(..) {
            connection.disconnect();
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Extend<EventConnection> for ConnectionSet {
    fn extend<I: IntoIterator<Item = EventConnection>>(&mut self, iter: I) {
        self.connections.extend(iter);
    }
}

impl Drop for ConnectionSet {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}
