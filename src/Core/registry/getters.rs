use super::*;

/// Read-only accessors for ConnectionRegistry
///
/// Each call takes the registry lock briefly, so the answer may be stale
/// by the time the caller looks at it.
impl ConnectionRegistry {
    /// Number of records currently linked
    pub fn len(&self) -> usize {
        self.state.lock().conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().conns.is_empty()
    }

    /// Check whether a connection has a record in the set
    pub fn contains(&self, id: ConnId) -> bool {
        self.state.lock().conns.contains_key(&id)
    }

    /// Returns true once the registry has been drained
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// The configured insert limit, if any
    pub fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }
}
