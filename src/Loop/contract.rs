//! The two seams between a transport and the rest of the messaging stack.
//!
//! [`Transport`] is what the connection layer calls into. [`ConnectionLayer`]
//! is what a transport calls back into: the receive path, send-side
//! retirement, congestion accounting and connection bookkeeping. Neither
//! trait knows anything about a physical medium.

use crate::error::Result;
use crate::Core::Connection::{AllocFlags, CongestionMap, Connection};
use crate::Core::Message::{IncomingDelivery, Message};
use std::io::IoSliceMut;
use std::net::IpAddr;
use std::sync::Arc;

/// Predicate handed to [`ConnectionLayer::send_drop_acked`] to restrict which
/// messages at or below the ack sequence get retired.
pub type AckFilter<'a> = &'a (dyn Fn(&Message, u64) -> bool + Sync);

/// Callbacks a transport makes into the surrounding connection layer.
pub trait ConnectionLayer: Send + Sync {
    /// Queue `inc` for the receiving socket. Must not block and must accept
    /// `saddr == daddr`. Ownership of the record passes to the callee.
    fn recv_incoming(
        &self,
        conn: &Arc<Connection>,
        saddr: IpAddr,
        daddr: IpAddr,
        inc: IncomingDelivery,
        gfp: AllocFlags,
    );

    /// Retire every sent message on `conn` with a sequence number `<= ack`.
    /// Retiring up to a sequence already retired is a no-op.
    fn send_drop_acked(&self, conn: &Arc<Connection>, ack: u64, is_acked: Option<AckFilter<'_>>);

    /// Bits in `portmask` of `map` changed.
    fn cong_map_updated(&self, map: &CongestionMap, portmask: u64);

    /// `conn` finished connecting.
    fn connect_complete(&self, conn: &Arc<Connection>);

    /// Tear `conn` down. Expected to end in the transport's `connection_free`.
    fn conn_destroy(&self, conn: Arc<Connection>);
}

/// The operations a transport exposes to the connection layer.
pub trait Transport: Send + Sync {
    /// Human-readable name, unique among registered transports.
    fn name(&self) -> &'static str;

    /// Send `rm` starting at `hdr_off` bytes into the header, then scatter
    /// segment `sg` at byte `off`. Returns the bytes consumed by this call.
    fn transmit(
        &self,
        conn: &Arc<Connection>,
        rm: &Message,
        hdr_off: usize,
        sg: usize,
        off: usize,
    ) -> usize;

    /// Process whatever has arrived for `conn`.
    fn receive_poll(&self, conn: &Arc<Connection>) -> Result<()>;

    fn connection_alloc(&self, conn: &Arc<Connection>, gfp: AllocFlags) -> Result<()>;

    fn connection_free(&self, conn: &Connection);

    fn connection_connect(&self, conn: &Arc<Connection>) -> Result<()>;

    fn connection_shutdown(&self, conn: &Arc<Connection>);

    /// Copy the payload of a delivered message into user buffers.
    fn inc_copy_to_user(&self, inc: &IncomingDelivery, iov: &mut [IoSliceMut<'_>]) -> usize;

    /// Drop the receive path's hold on a delivered message.
    fn inc_free(&self, inc: IncomingDelivery);

    /// True for transports that only ever talk to the local host.
    fn is_loopback(&self) -> bool {
        false
    }
}
