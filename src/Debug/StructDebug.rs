use std::fmt;
use crate::Core::registry::{ConnectionRegistry, LoopConnection};
use crate::Core::Connection::Connection;
use crate::Core::Message::Message;
use crate::Loop::contract::Transport;
use crate::Loop::LoopTransport;

/// Debug function for ConnectionRegistry
///
/// Shows:
/// - Number of linked records
/// - Whether the registry has been drained
/// - Insert limit
pub fn debug_connection_registry(registry: &ConnectionRegistry, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConnectionRegistry")
        .field("len", &registry.len())
        .field("closed", &registry.is_closed())
        .field("max_connections", &registry.max_connections())
        .finish()
}

/// Debug function for LoopConnection
///
/// Names the owning connection by id only; printing the connection itself
/// would walk back into its transport data.
pub fn debug_loop_connection(lc: &LoopConnection, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LoopConnection")
        .field("conn", &lc.id())
        .finish()
}

pub fn debug_connection(conn: &Connection, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Connection")
        .field("id", &conn.id())
        .field("laddr", &conn.laddr())
        .field("faddr", &conn.faddr())
        .field("passive", &conn.is_passive())
        .field("transport_data", &conn.transport_data().map(|_| "<opaque>"))
        .finish()
}

/// Debug function for Message
///
/// Shows the header and segment sizes, never payload bytes
pub fn debug_message(rm: &Message, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let seg_lens: Vec<usize> = rm.segments().iter().map(|s| s.len()).collect();
    f.debug_struct("Message")
        .field("header", rm.header())
        .field("segments", &seg_lens)
        .field("refcount", &rm.refcount())
        .finish()
}

pub fn debug_loop_transport(transport: &LoopTransport, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LoopTransport")
        .field("name", &transport.name())
        .field("registry", transport.registry())
        .field("layer", &"<opaque>")
        .finish_non_exhaustive()
}
