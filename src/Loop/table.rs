// Process-wide table of registered transports

use super::contract::Transport;
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref TRANSPORTS: RwLock<Vec<Arc<dyn Transport>>> = RwLock::new(Vec::new());
}

/// Make a transport available to connection setup. Names must be unique.
pub fn register_transport(transport: Arc<dyn Transport>) -> Result<()> {
    let mut table = TRANSPORTS.write();
    let name = transport.name();
    if table.iter().any(|t| t.name() == name) {
        return Err(Error::DuplicateTransport(name));
    }
    debug!(transport = name, "registered transport");
    table.push(transport);
    Ok(())
}

pub fn unregister_transport(name: &str) -> Option<Arc<dyn Transport>> {
    let mut table = TRANSPORTS.write();
    let pos = table.iter().position(|t| t.name() == name)?;
    debug!(transport = name, "unregistered transport");
    Some(table.remove(pos))
}

pub fn transport_by_name(name: &str) -> Option<Arc<dyn Transport>> {
    TRANSPORTS.read().iter().find(|t| t.name() == name).cloned()
}

/// Pick the transport a new connection between `laddr` and `faddr` should use.
///
/// A connection to ourselves always goes over a loopback transport; anything
/// else goes to the first transport registered that is not one.
pub fn preferred_transport(laddr: IpAddr, faddr: IpAddr) -> Option<Arc<dyn Transport>> {
    let want_loopback = laddr == faddr;
    TRANSPORTS
        .read()
        .iter()
        .find(|t| t.is_loopback() == want_loopback)
        .cloned()
}

/// Names of all registered transports, in registration order.
pub fn registered_transports() -> Vec<&'static str> {
    TRANSPORTS.read().iter().map(|t| t.name()).collect()
}
