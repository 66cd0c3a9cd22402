// src/Loop/transport.rs

use super::contract::{ConnectionLayer, Transport};
use super::stats::{LoopStats, StatsSnapshot};
use crate::error::{Error, Result};
use crate::Core::registry::{ConnectionRegistry, LoopConnection};
use crate::Core::Connection::{AllocFlags, Connection};
use crate::Core::Message::{IncomingDelivery, Message};
use std::fmt;
use std::io::IoSliceMut;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default name the loopback transport registers under.
pub const LOOP_TRANSPORT_NAME: &str = "loopback";

/// Every bit of a congestion map.
const ALL_PORTS: u64 = !0;

/// A transport that hands every message straight to the local receive path.
///
/// Delivery and acknowledgment both happen inside [`Transport::transmit`],
/// so there is nothing to poll, nothing to retry and nothing to tear down
/// on shutdown. The only state is the set of live connections, kept so
/// they can be destroyed on [`LoopTransport::exit`].
pub struct LoopTransport {
    name: &'static str,
    layer: Arc<dyn ConnectionLayer>,
    registry: ConnectionRegistry,
    recv_gfp: AllocFlags,
    stats: LoopStats,
}

impl LoopTransport {
    pub fn new(registry: ConnectionRegistry, layer: Arc<dyn ConnectionLayer>) -> Self {
        Self {
            name: LOOP_TRANSPORT_NAME,
            layer,
            registry,
            recv_gfp: AllocFlags::Kernel,
            stats: LoopStats::default(),
        }
    }

    pub(crate) fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub(crate) fn with_recv_gfp(mut self, gfp: AllocFlags) -> Self {
        self.recv_gfp = gfp;
        self
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Destroy every connection still using this transport.
    ///
    /// The registry is emptied and closed under its lock; the connections
    /// are destroyed afterwards, since destroying one calls back into
    /// [`Transport::connection_free`] which takes the same lock.
    /// Returns the number of connections destroyed.
    pub fn exit(&self) -> usize {
        let drained = self.registry.drain();
        info!(transport = self.name, count = drained.len(), "destroying loopback connections");

        let count = drained.len();
        for lc in drained {
            let conn = Arc::clone(&lc.conn);
            if conn.is_passive() {
                warn!(conn = conn.id(), "passive connection on the loopback transport at exit");
            }
            self.stats.record_exit_destroy(conn.is_passive());
            self.layer.conn_destroy(conn);
        }
        count
    }
}

impl Transport for LoopTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    /// Deliver `rm` to the local receive path and retire it at once.
    ///
    /// A congestion bitmap is never delivered: it only marks the remote
    /// congestion map as fully changed.
    ///
    /// # Panics
    /// If any of `hdr_off`, `sg`, `off` is nonzero for a data message. The
    /// loopback transport always consumes whole messages, so a partial
    /// resume means the caller's bookkeeping is broken.
    fn transmit(
        &self,
        conn: &Arc<Connection>,
        rm: &Message,
        hdr_off: usize,
        sg: usize,
        off: usize,
    ) -> usize {
        let hdr = *rm.header();
        let ret = hdr.wire_len();

        if hdr.is_cong_bitmap() {
            self.layer.cong_map_updated(conn.fcong(), ALL_PORTS);
            self.stats.record_cong_update();
            // Clamped against the first segment whatever `sg` says.
            let remaining = rm
                .segments()
                .first()
                .map_or(0, |seg| seg.len().saturating_sub(conn.xmit_data_off()));
            return ret.min(remaining);
        }

        assert!(
            hdr_off == 0 && sg == 0 && off == 0,
            "loopback transmit resumed mid-message (hdr_off={hdr_off}, sg={sg}, off={off})"
        );

        rm.inc_init(conn.id(), conn.laddr(), conn.laddr());

        // Keeps the message alive across delivery whatever the receive path does.
        let inc = rm.to_incoming();

        self.layer
            .recv_incoming(conn, conn.laddr(), conn.faddr(), inc.acquire(), self.recv_gfp);

        self.layer.send_drop_acked(conn, hdr.sequence, None);

        inc.release();

        debug!(conn = conn.id(), sequence = hdr.sequence, bytes = ret, "loopback transmit");
        self.stats.record_xmit(ret);
        ret
    }

    fn receive_poll(&self, _conn: &Arc<Connection>) -> Result<()> {
        Ok(())
    }

    fn connection_alloc(&self, conn: &Arc<Connection>, _gfp: AllocFlags) -> Result<()> {
        let lc = Arc::new(LoopConnection::new(Arc::clone(conn)));
        if conn.set_transport_data(Arc::clone(&lc) as Arc<dyn std::any::Any + Send + Sync>).is_err() {
            return Err(Error::AlreadyAllocated(conn.id()));
        }

        // Linked to the connection first, so an exit drain that picks the
        // record up can always find it again through `connection_free`.
        if let Err(e) = self.registry.insert(lc) {
            conn.take_transport_data();
            return Err(e);
        }

        debug!(conn = conn.id(), "loopback connection allocated");
        self.stats.record_alloc();
        Ok(())
    }

    fn connection_free(&self, conn: &Connection) {
        let Some(data) = conn.take_transport_data() else {
            return;
        };
        let lc = match data.downcast::<LoopConnection>() {
            Ok(lc) => lc,
            Err(foreign) => {
                debug!(conn = conn.id(), "connection carries foreign transport state");
                let _ = conn.set_transport_data(foreign);
                return;
            }
        };

        debug!(conn = lc.id(), "loopback connection freed");
        // Absent if exit already drained it.
        self.registry.remove(lc.id());
        self.stats.record_free();
    }

    fn connection_connect(&self, conn: &Arc<Connection>) -> Result<()> {
        self.layer.connect_complete(conn);
        Ok(())
    }

    fn connection_shutdown(&self, _conn: &Arc<Connection>) {}

    fn inc_copy_to_user(&self, inc: &IncomingDelivery, iov: &mut [IoSliceMut<'_>]) -> usize {
        inc.message().copy_to_iovec(iov)
    }

    fn inc_free(&self, inc: IncomingDelivery) {
        inc.release();
    }

    fn is_loopback(&self) -> bool {
        true
    }
}

impl fmt::Debug for LoopTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_loop_transport(self, f)
    }
}
