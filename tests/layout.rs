// Layout conformance tests for the framed message header.
// These assert size, alignment and field offsets of WireHeader and print
// the observed values to aid debugging when a mismatch occurs.
use memoffset::offset_of;
use rds_loop::Loop::Structs::{Header, MessageFlags, WireHeader, HEADER_SIZE};
use std::mem::{align_of, size_of};

#[test]
fn test_wire_header_layout() {
    let raw = 8 + 8 + 4 + 2 + 2 + 1 + 1 + 4 + 2 + 16; // 48 bytes of fields

    let size = size_of::<WireHeader>();
    let align = align_of::<WireHeader>();
    let off_sequence = offset_of!(WireHeader, h_sequence);
    let off_ack = offset_of!(WireHeader, h_ack);
    let off_len = offset_of!(WireHeader, h_len);
    let off_sport = offset_of!(WireHeader, h_sport);
    let off_dport = offset_of!(WireHeader, h_dport);
    let off_flags = offset_of!(WireHeader, h_flags);
    let off_credit = offset_of!(WireHeader, h_credit);
    let off_padding = offset_of!(WireHeader, h_padding);
    let off_csum = offset_of!(WireHeader, h_csum);
    let off_exthdr = offset_of!(WireHeader, h_exthdr);

    println!(
        "WireHeader => size: {size}, expected: {raw}, align: {align}, offsets: [sequence:{off_sequence}, ack:{off_ack}, len:{off_len}, sport:{off_sport}, dport:{off_dport}, flags:{off_flags}, credit:{off_credit}, padding:{off_padding}, csum:{off_csum}, exthdr:{off_exthdr}]"
    );

    assert_eq!(size, raw);
    assert_eq!(HEADER_SIZE, 48);
    assert_eq!(align, align_of::<u64>());
    assert_eq!(off_sequence, 0);
    assert_eq!(off_ack, 8);
    assert_eq!(off_len, 16);
    assert_eq!(off_sport, 20);
    assert_eq!(off_dport, 22);
    assert_eq!(off_flags, 24);
    assert_eq!(off_credit, 25);
    assert_eq!(off_padding, 26);
    assert_eq!(off_csum, 30);
    assert_eq!(off_exthdr, 32);
}

#[test]
fn test_flag_bits_match_wire_values() {
    assert_eq!(MessageFlags::CONG_BITMAP.bits(), 0x01);
    assert_eq!(MessageFlags::ACK_REQUIRED.bits(), 0x02);
    assert_eq!(MessageFlags::RETRANSMITTED.bits(), 0x04);

    let hdr = Header {
        sequence: 1,
        len: 64,
        flags: MessageFlags::CONG_BITMAP | MessageFlags::ACK_REQUIRED,
    };
    assert!(hdr.is_cong_bitmap());
    assert_eq!(hdr.wire_len(), 64 + HEADER_SIZE);
}
