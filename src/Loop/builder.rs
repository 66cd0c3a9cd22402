use super::contract::{ConnectionLayer, Transport};
use super::table::register_transport;
use super::transport::{LoopTransport, LOOP_TRANSPORT_NAME};
use crate::error::Result;
use crate::Core::registry::ConnectionRegistry;
use crate::Core::Connection::AllocFlags;
use std::sync::Arc;

pub struct LoopTransportBuilder {
    name: &'static str,
    max_connections: Option<usize>,
    recv_gfp: AllocFlags,
}

impl Default for LoopTransportBuilder {
    fn default() -> Self {
        Self {
            name: LOOP_TRANSPORT_NAME,
            max_connections: None, // No limit beyond available memory
            recv_gfp: AllocFlags::Kernel,
        }
    }
}

impl LoopTransportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Allocation context passed along with every delivery.
    pub fn with_alloc_flags(mut self, gfp: AllocFlags) -> Self {
        self.recv_gfp = gfp;
        self
    }

    pub fn build(self, layer: Arc<dyn ConnectionLayer>) -> LoopTransport {
        let registry = ConnectionRegistry::with_max_connections(self.max_connections);
        LoopTransport::new(registry, layer)
            .with_name(self.name)
            .with_recv_gfp(self.recv_gfp)
    }

    /// Build the transport and add it to the process-wide transport table.
    pub fn build_registered(self, layer: Arc<dyn ConnectionLayer>) -> Result<Arc<LoopTransport>> {
        let transport = Arc::new(self.build(layer));
        register_transport(Arc::clone(&transport) as Arc<dyn Transport>)?;
        Ok(transport)
    }
}
