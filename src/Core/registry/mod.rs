use crate::error::{Error, Result};
use crate::Core::Connection::{ConnId, Connection};
use std::collections::HashMap;
use std::sync::Arc;
mod debug;
mod getters;

// Use parking_lot's Mutex for better performance
use parking_lot::Mutex;

/// Loopback state attached to a single connection
pub struct LoopConnection {
    /// The connection this record belongs to
    pub conn: Arc<Connection>,
}

impl LoopConnection {
    pub fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }

    /// Get the id of the owning connection
    pub fn id(&self) -> ConnId {
        self.conn.id()
    }
}

struct RegistryState {
    conns: HashMap<ConnId, Arc<LoopConnection>>,
    closed: bool,
}

/// Set of live loopback connections.
///
/// Every operation holds the lock only for a map insert, remove or swap.
/// Nothing calls out to connection teardown while the lock is held.
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
    max_connections: Option<usize>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_max_connections(None)
    }

    // Create a registry that refuses inserts beyond `max` records
    pub fn with_max_connections(max: Option<usize>) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                conns: HashMap::new(),
                closed: false,
            }),
            max_connections: max,
        }
    }

    /// Link a record into the set.
    ///
    /// On error the registry is unchanged.
    pub fn insert(&self, record: Arc<LoopConnection>) -> Result<()> {
        let id = record.id();
        let mut state = self.state.lock();

        if state.closed {
            return Err(Error::ShuttingDown);
        }
        if state.conns.contains_key(&id) {
            return Err(Error::AlreadyAllocated(id));
        }
        if let Some(max) = self.max_connections {
            if state.conns.len() >= max {
                return Err(Error::OutOfMemory("maximum number of loopback connections reached"));
            }
        }
        state
            .conns
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("loopback connection table"))?;

        state.conns.insert(id, record);
        Ok(())
    }

    /// Unlink a record. Returns `None` if it is not present, e.g. because
    /// [`ConnectionRegistry::drain`] already took it.
    pub fn remove(&self, id: ConnId) -> Option<Arc<LoopConnection>> {
        self.state.lock().conns.remove(&id)
    }

    /// Empty the set and close it to further inserts.
    ///
    /// The prior contents are returned for the caller to dispose of after
    /// the lock has been released.
    pub fn drain(&self) -> Vec<Arc<LoopConnection>> {
        let drained = {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.conns)
        };
        drained.into_values().collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
