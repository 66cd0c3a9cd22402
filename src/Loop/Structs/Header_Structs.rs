// Header types for framed messages handed to a transport

use bitflags::bitflags;

bitflags! {
    /// Flags carried in a message header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u8 {
        /// The payload is a congestion bitmap, not user data.
        const CONG_BITMAP   = 0b0000_0001;
        /// The sender wants an explicit ack for this message.
        const ACK_REQUIRED  = 0b0000_0010;
        /// The message is being sent again after a reconnect.
        const RETRANSMITTED = 0b0000_0100;
    }
}

/// Host-order view of the header fields a transport cares about.
///
/// Fixed once the owning message is built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub sequence: u64,
    pub len: u32,
    pub flags: MessageFlags,
}

impl Header {
    pub fn is_cong_bitmap(&self) -> bool {
        self.flags.contains(MessageFlags::CONG_BITMAP)
    }

    /// Size of the framed message: header plus declared payload.
    #[inline]
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE + self.len as usize
    }
}

/// Framed header layout as it precedes every message.
/// Multi-byte fields are big-endian on the wire.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct WireHeader {
    pub h_sequence: u64,
    pub h_ack: u64,
    pub h_len: u32,
    pub h_sport: u16,
    pub h_dport: u16,
    pub h_flags: u8,
    pub h_credit: u8,
    pub h_padding: [u8; 4],
    pub h_csum: u16,
    pub h_exthdr: [u8; 16],
}

/// Bytes every framed message spends on its header.
pub const HEADER_SIZE: usize = std::mem::size_of::<WireHeader>();
