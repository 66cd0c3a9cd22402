// Shared harness: a connection layer that records every callback it gets
#![allow(dead_code)]

use parking_lot::Mutex;
use rds_loop::Core::Connection::{AllocFlags, CongestionMap, ConnId, Connection};
use rds_loop::Core::IncomingDelivery;
use rds_loop::Loop::{AckFilter, ConnectionLayer, LoopTransport, LoopTransportBuilder, Transport};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, OnceLock, Weak};

pub struct Delivered {
    pub conn: ConnId,
    pub saddr: IpAddr,
    pub daddr: IpAddr,
    pub gfp: AllocFlags,
    pub inc: IncomingDelivery,
}

#[derive(Default)]
pub struct RecordingLayer {
    transport: OnceLock<Weak<dyn Transport>>,
    pub deliveries: Mutex<Vec<Delivered>>,
    /// Highest sequence retired per connection
    pub acked: Mutex<HashMap<ConnId, u64>>,
    pub retire_calls: Mutex<Vec<(ConnId, u64)>>,
    pub cong_updates: Mutex<Vec<(IpAddr, u64)>>,
    pub connected: Mutex<Vec<ConnId>>,
    pub destroyed: Mutex<Vec<ConnId>>,
}

impl RecordingLayer {
    pub fn attach(&self, transport: &Arc<LoopTransport>) {
        let weak = Arc::downgrade(transport);
        let weak: Weak<dyn Transport> = weak;
        let _ = self.transport.set(weak);
    }

    pub fn take_deliveries(&self) -> Vec<Delivered> {
        std::mem::take(&mut *self.deliveries.lock())
    }

    pub fn acked_through(&self, conn: ConnId) -> Option<u64> {
        self.acked.lock().get(&conn).copied()
    }
}

impl ConnectionLayer for RecordingLayer {
    fn recv_incoming(
        &self,
        conn: &Arc<Connection>,
        saddr: IpAddr,
        daddr: IpAddr,
        inc: IncomingDelivery,
        gfp: AllocFlags,
    ) {
        self.deliveries.lock().push(Delivered {
            conn: conn.id(),
            saddr,
            daddr,
            gfp,
            inc,
        });
    }

    fn send_drop_acked(&self, conn: &Arc<Connection>, ack: u64, _is_acked: Option<AckFilter<'_>>) {
        self.retire_calls.lock().push((conn.id(), ack));
        let mut acked = self.acked.lock();
        let entry = acked.entry(conn.id()).or_insert(ack);
        *entry = (*entry).max(ack);
    }

    fn cong_map_updated(&self, map: &CongestionMap, portmask: u64) {
        self.cong_updates.lock().push((map.addr(), portmask));
    }

    fn connect_complete(&self, conn: &Arc<Connection>) {
        self.connected.lock().push(conn.id());
    }

    fn conn_destroy(&self, conn: Arc<Connection>) {
        if let Some(transport) = self.transport.get().and_then(Weak::upgrade) {
            transport.connection_shutdown(&conn);
            transport.connection_free(&conn);
        }
        self.destroyed.lock().push(conn.id());
    }
}

pub fn localhost() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

/// A loopback transport wired to a fresh recording layer.
pub fn loopback() -> (Arc<LoopTransport>, Arc<RecordingLayer>) {
    loopback_with(LoopTransportBuilder::new())
}

pub fn loopback_with(builder: LoopTransportBuilder) -> (Arc<LoopTransport>, Arc<RecordingLayer>) {
    let layer = Arc::new(RecordingLayer::default());
    let transport = Arc::new(builder.build(layer.clone()));
    layer.attach(&transport);
    (transport, layer)
}

/// Allocate and connect a connection from localhost to itself.
pub fn connected(transport: &LoopTransport) -> Arc<Connection> {
    let conn = Connection::new(localhost(), localhost());
    transport
        .connection_alloc(&conn, AllocFlags::Kernel)
        .expect("loopback alloc");
    transport.connection_connect(&conn).expect("loopback connect");
    conn
}
