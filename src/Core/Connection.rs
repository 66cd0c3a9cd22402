// Connection handles shared between the connection layer and a transport

use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

pub type ConnId = u64;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Allocation-urgency hint passed down with connection setup and delivery.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AllocFlags {
    /// The caller may block while memory is found.
    #[default]
    Kernel,
    /// The caller must not block.
    Atomic,
}

/// Per-destination congestion bitmap owned by the connection layer.
/// A transport only ever names it when announcing an update.
#[derive(Debug)]
pub struct CongestionMap {
    addr: IpAddr,
}

impl CongestionMap {
    pub fn new(addr: IpAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }
}

/// A connection between a local and a remote address.
///
/// Created and destroyed by the connection layer. A transport hangs its
/// private state off [`Connection::set_transport_data`].
pub struct Connection {
    id: ConnId,
    laddr: IpAddr,
    faddr: IpAddr,
    passive: bool,
    fcong: Arc<CongestionMap>,
    /// Bytes of the current message's data already handed to the transport.
    xmit_data_off: AtomicUsize,
    transport_data: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

impl Connection {
    /// A connection we initiated.
    pub fn new(laddr: IpAddr, faddr: IpAddr) -> Arc<Self> {
        Self::create(laddr, faddr, false)
    }

    /// A connection created by accepting an inbound request from a peer.
    pub fn accepted(laddr: IpAddr, faddr: IpAddr) -> Arc<Self> {
        Self::create(laddr, faddr, true)
    }

    fn create(laddr: IpAddr, faddr: IpAddr, passive: bool) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed),
            laddr,
            faddr,
            passive,
            fcong: Arc::new(CongestionMap::new(faddr)),
            xmit_data_off: AtomicUsize::new(0),
            transport_data: Mutex::new(None),
        })
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    pub fn laddr(&self) -> IpAddr {
        self.laddr
    }

    pub fn faddr(&self) -> IpAddr {
        self.faddr
    }

    pub fn is_passive(&self) -> bool {
        self.passive
    }

    /// The congestion map of the remote end.
    pub fn fcong(&self) -> &Arc<CongestionMap> {
        &self.fcong
    }

    pub fn xmit_data_off(&self) -> usize {
        self.xmit_data_off.load(Ordering::Acquire)
    }

    pub fn set_xmit_data_off(&self, off: usize) {
        self.xmit_data_off.store(off, Ordering::Release);
    }

    pub fn transport_data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.transport_data.lock().clone()
    }

    /// Attach transport state. Fails, handing `data` back, if some is already attached.
    pub fn set_transport_data(
        &self,
        data: Arc<dyn Any + Send + Sync>,
    ) -> Result<(), Arc<dyn Any + Send + Sync>> {
        let mut slot = self.transport_data.lock();
        if slot.is_some() {
            return Err(data);
        }
        *slot = Some(data);
        Ok(())
    }

    pub fn take_transport_data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.transport_data.lock().take()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_connection(self, f)
    }
}
