extern crate tcpguard;

use byteorder::{BigEndian, ByteOrder};
use tcpguard::checksum::checksum;
use tcpguard::config::StaticConfig;
use tcpguard::events::{Event, RecordingEventSink};
use tcpguard::header::{tcp_flags, TcpHeaderSlice, TCP_HEADER_LEN};
use tcpguard::ip_context::{IpAddrCtx, IpLayerContext};
use tcpguard::state::PacketState;
use tcpguard::{Direction, EncodeState, EncodeType, Interface};

fn base_syn() -> Vec<u8> {
    let mut h = vec![0u8; TCP_HEADER_LEN];
    BigEndian::write_u16(&mut h[0..2], 40000);
    BigEndian::write_u16(&mut h[2..4], 80);
    BigEndian::write_u32(&mut h[4..8], 1);
    BigEndian::write_u32(&mut h[8..12], 0);
    h[12] = 5 << 4;
    h[13] = tcp_flags::SYN;
    BigEndian::write_u16(&mut h[14..16], 8192);
    h
}

fn fill_checksum(ip: &IpLayerContext, segment: &mut [u8]) {
    segment[16] = 0;
    segment[17] = 0;
    let pseudo = ip.pseudo_header(segment.len());
    let sum = checksum(&pseudo, segment);
    BigEndian::write_u16(&mut segment[16..18], sum);
}

/// S7 (RST encode): given the inbound SYN of S1, reverse-encoding a
/// TCP_RST should produce an output header with swapped ports,
/// flags RST|ACK, seq == inbound ack, ack == inbound seq + 0 + 1,
/// window 0, data offset 5, and a checksum that verifies under the
/// inverted pseudoheader.
#[test]
fn s7_rst_encode_from_inbound_syn() {
    let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), Some(1));
    let mut raw = base_syn();
    fill_checksum(&ip, &mut raw);

    let sensor = StaticConfig::passive();
    let mut sink = RecordingEventSink::new();
    let mut pkt = PacketState::new();
    let outcome = tcpguard::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);
    assert!(outcome.ok);

    let original = pkt.tcph.expect("decode populated the header");
    let state = EncodeState {
        original,
        original_dsize: pkt.data.len(),
        ip,
        encode_type: EncodeType::Rst,
        direction: Direction::Reverse,
        interface: Interface::Passive,
        payload: None,
        seq_delta: None,
    };

    let mut out = [0u8; TCP_HEADER_LEN];
    let n = tcpguard::encode(&state, &mut out).expect("response fits in a bare 20-byte header");
    assert_eq!(n, TCP_HEADER_LEN);

    let response = TcpHeaderSlice::new(&out);
    assert_eq!(response.source_port(), original.destination_port());
    assert_eq!(response.destination_port(), original.source_port());
    assert_eq!(response.flags_raw(), tcp_flags::RST | tcp_flags::ACK);
    assert_eq!(response.sequence_number(), original.acknowledgment_number());
    assert_eq!(response.acknowledgment_number(), original.sequence_number().wrapping_add(1));
    assert_eq!(response.window_size(), 0);
    assert_eq!(response.data_offset(), 5);

    let response_ip = ip.reversed();
    let pseudo = response_ip.pseudo_header(TCP_HEADER_LEN);
    assert_eq!(checksum(&pseudo, &out), 0);
}

/// A malformed segment whose option region runs exactly up to
/// TCP_OPTLENMAX still decodes without tripping the defensive
/// "region too long" fault, since the data offset field can never
/// express more than that.
#[test]
fn maximal_option_region_is_accepted() {
    let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
    let mut raw = base_syn();
    raw[12] = 0xf << 4;
    raw.extend(std::iter::repeat(1u8).take(40));
    fill_checksum(&ip, &mut raw);

    let sensor = StaticConfig::passive();
    let mut sink = RecordingEventSink::new();
    let mut pkt = PacketState::new();
    let outcome = tcpguard::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);

    assert!(outcome.ok);
    assert_eq!(pkt.options_count, 40);
    assert!(!sink.contains(Event::TcpoptBadlen));
    assert!(!sink.contains(Event::TcpoptTruncated));
}

/// Bare segment with no SYN/ACK/RST raises NO_SYN_ACK_RST.
#[test]
fn no_control_flags_raises_no_syn_ack_rst() {
    let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
    let mut raw = base_syn();
    raw[13] = 0;
    fill_checksum(&ip, &mut raw);

    let sensor = StaticConfig::passive();
    let mut sink = RecordingEventSink::new();
    let mut pkt = PacketState::new();
    let outcome = tcpguard::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);

    assert!(outcome.ok);
    assert!(sink.contains(Event::TcpNoSynAckRst));
}

/// FIN without ACK raises MUST_ACK.
#[test]
fn fin_without_ack_raises_must_ack() {
    let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
    let mut raw = base_syn();
    raw[13] = tcp_flags::FIN;
    fill_checksum(&ip, &mut raw);

    let sensor = StaticConfig::passive();
    let mut sink = RecordingEventSink::new();
    let mut pkt = PacketState::new();
    let outcome = tcpguard::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);

    assert!(outcome.ok);
    assert!(sink.contains(Event::TcpMustAck));
}

/// A SYN targeting a configured multicast destination raises
/// SYN_TO_MULTICAST once the global multicast variable is bound.
#[test]
fn syn_to_multicast_destination_is_flagged() {
    tcpguard::codec::pinit().expect("literal CIDR list always parses");

    let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([239, 1, 2, 3]), None);
    let mut raw = base_syn();
    fill_checksum(&ip, &mut raw);

    let sensor = StaticConfig::passive();
    let mut sink = RecordingEventSink::new();
    let mut pkt = PacketState::new();
    let outcome = tcpguard::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);

    assert!(outcome.ok);
    assert!(sink.contains(Event::SynToMulticast));

    tcpguard::codec::pterm();
}

/// Urgent pointer past the end of the payload raises BAD_URP.
#[test]
fn bad_urgent_pointer_is_flagged() {
    let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
    let mut raw = base_syn();
    raw[13] = tcp_flags::URG | tcp_flags::ACK;
    BigEndian::write_u16(&mut raw[18..20], 50);
    raw.extend_from_slice(b"hi");
    fill_checksum(&ip, &mut raw);

    let sensor = StaticConfig::passive();
    let mut sink = RecordingEventSink::new();
    let mut pkt = PacketState::new();
    let outcome = tcpguard::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);

    assert!(outcome.ok);
    assert!(sink.contains(Event::TcpBadUrp));
}
