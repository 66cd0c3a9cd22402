// Module naming follows project convention (Loop = the loopback transport)
#[allow(non_snake_case)]
pub mod Core {
    pub mod Connection;
    pub mod Message;
    pub mod registry;
    pub use Connection::{AllocFlags, CongestionMap, ConnId}; // re-export for stable path
    pub use Message::{IncomingDelivery, IncomingInfo, MessageBuilder};
    pub use registry::{ConnectionRegistry, LoopConnection};
}
#[allow(non_snake_case)]
pub mod Loop {
    pub mod Structs {
        pub mod Header_Structs;
        pub use Header_Structs::{Header, MessageFlags, WireHeader, HEADER_SIZE}; // re-export for stable path
    }
    mod builder;
    pub mod contract;
    pub mod stats;
    pub mod table;
    mod transport;

    pub use builder::LoopTransportBuilder;
    pub use contract::{AckFilter, ConnectionLayer, Transport};
    pub use stats::StatsSnapshot;
    pub use transport::{LoopTransport, LOOP_TRANSPORT_NAME};
}
#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}
pub mod error;

pub use error::{Error, Result};
