//! The response-segment encoder (spec §4.5): synthesises a TCP RST or
//! FIN/PUSH segment mirroring an inbound one, with direction-aware
//! sequence/acknowledgement arithmetic and a freshly recomputed
//! checksum. Writes only into a caller-supplied buffer with an explicit
//! bounds check — no growing, no allocation.

use core::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::checksum::checksum_segments;
use crate::header::{tcp_flags, TcpHeaderSlice, TCP_HEADER_LEN};
use crate::ip_context::IpLayerContext;
use crate::state::PacketState;

/// Whether the sensor sits on the data path (and may act on the packets
/// it decodes) or is a passive tap. Drives the forward-direction
/// sequence-number arithmetic of spec §4.5 step 4.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Interface {
    Inline,
    Passive,
}

/// Which response segment to synthesise.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EncodeType {
    Rst,
    Fin,
    Push,
}

/// Whether the response travels in the same direction as the original
/// segment or back towards its sender.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Everything the encoder needs about the segment it is responding to
/// and the response it should build.
pub struct EncodeState<'a> {
    pub original: TcpHeaderSlice<'a>,
    /// Payload size of the *original* inbound segment (its `dsize`),
    /// consumed by the seq/ack arithmetic of step 4.
    pub original_dsize: usize,
    pub ip: IpLayerContext,
    pub encode_type: EncodeType,
    pub direction: Direction,
    pub interface: Interface,
    /// Payload to attach; only consulted for FIN/PUSH types.
    pub payload: Option<&'a [u8]>,
    /// Optional signed adjustment applied to the computed sequence
    /// number after direction handling (step 5).
    pub seq_delta: Option<i32>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EncodeError {
    BufferOverflow,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::BufferOverflow => write!(f, "output buffer too small for the encoded segment"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Synthesises a response segment into `out`, returning the number of
/// bytes written. `out` must already be at least as large as the
/// encoded segment; this function never grows it.
pub fn encode(state: &EncodeState<'_>, out: &mut [u8]) -> Result<usize, EncodeError> {
    let payload = match state.encode_type {
        EncodeType::Fin | EncodeType::Push => state.payload.unwrap_or(&[]),
        EncodeType::Rst => &[],
    };
    let total_len = TCP_HEADER_LEN + payload.len();

    if out.len() < total_len {
        return Err(EncodeError::BufferOverflow);
    }

    let ctl: u32 = if state.original.syn() { 1 } else { 0 };
    let dsize = state.original_dsize as u32;

    let (source_port, destination_port, seq, ack) = match state.direction {
        Direction::Forward => {
            let seq = match state.interface {
                Interface::Inline => state.original.sequence_number(),
                Interface::Passive => state.original.sequence_number().wrapping_add(dsize).wrapping_add(ctl),
            };
            (
                state.original.source_port(),
                state.original.destination_port(),
                seq,
                state.original.acknowledgment_number(),
            )
        }
        Direction::Reverse => (
            state.original.destination_port(),
            state.original.source_port(),
            state.original.acknowledgment_number(),
            state.original.sequence_number().wrapping_add(dsize).wrapping_add(ctl),
        ),
    };

    let seq = match state.seq_delta {
        Some(delta) => seq.wrapping_add(delta as u32),
        None => seq,
    };

    let (flags, window) = match state.encode_type {
        EncodeType::Fin => (tcp_flags::ACK | tcp_flags::FIN, 0u16),
        EncodeType::Push => (tcp_flags::ACK | tcp_flags::PSH, 65535u16),
        EncodeType::Rst => (tcp_flags::RST | tcp_flags::ACK, 0u16),
    };

    let header = &mut out[..TCP_HEADER_LEN];
    BigEndian::write_u16(&mut header[0..2], source_port);
    BigEndian::write_u16(&mut header[2..4], destination_port);
    BigEndian::write_u32(&mut header[4..8], seq);
    BigEndian::write_u32(&mut header[8..12], ack);
    header[12] = 5 << 4;
    header[13] = flags;
    BigEndian::write_u16(&mut header[14..16], window);
    header[16] = 0;
    header[17] = 0;
    BigEndian::write_u16(&mut header[18..20], 0);

    if !payload.is_empty() {
        out[TCP_HEADER_LEN..total_len].copy_from_slice(payload);
    }

    let response_ip = match state.direction {
        Direction::Forward => state.ip,
        Direction::Reverse => state.ip.reversed(),
    };
    let pseudo = response_ip.pseudo_header(total_len);
    let sum = checksum_segments(&pseudo, &[&out[..TCP_HEADER_LEN], &out[TCP_HEADER_LEN..total_len]]);
    BigEndian::write_u16(&mut out[16..18], sum);

    Ok(total_len)
}

/// Recomputes the checksum of an already-built segment after another
/// pipeline stage edited its payload, growing `*len` to cover the full
/// segment. Skips recomputation for a cooked (sensor-synthesised)
/// packet that isn't a rebuilt fragment, since such a packet's checksum
/// is already trusted (spec §7, "cooked packet"). Fails if `pkt` never
/// successfully decoded a header (`pkt.tcph` is `None`): there's no
/// trustworthy header length to recompute over.
pub fn update(pkt: &PacketState<'_>, ip: &IpLayerContext, layer: &mut [u8], len: &mut usize) -> bool {
    if pkt.cooked && !pkt.rebuilt_fragment {
        return true;
    }

    let header_len = match &pkt.tcph {
        Some(tcph) => tcph.data_offset() as usize * 4,
        None => return false,
    };

    let total_len = header_len + pkt.data.len();
    if layer.len() < total_len {
        return false;
    }

    layer[16] = 0;
    layer[17] = 0;

    let pseudo = ip.pseudo_header(total_len);
    let sum = checksum_segments(&pseudo, &[&layer[..header_len], &layer[header_len..total_len]]);
    BigEndian::write_u16(&mut layer[16..18], sum);

    *len = total_len;
    true
}

/// Refreshes a cloned, direction-reversed copy of a header: swaps its
/// port fields in place and mirrors the swap into the cloned packet's
/// decoded state.
pub fn format(reversed: bool, copy_header: &mut [u8], copy_pkt: &mut PacketState<'_>) {
    if !reversed || copy_header.len() < TCP_HEADER_LEN {
        return;
    }

    let source_port = BigEndian::read_u16(&copy_header[0..2]);
    let destination_port = BigEndian::read_u16(&copy_header[2..4]);
    BigEndian::write_u16(&mut copy_header[0..2], destination_port);
    BigEndian::write_u16(&mut copy_header[2..4], source_port);

    copy_pkt.source_port = destination_port;
    copy_pkt.destination_port = source_port;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ip_context::IpAddrCtx;

    fn syn_header() -> [u8; 20] {
        let mut h = [0u8; 20];
        BigEndian::write_u16(&mut h[0..2], 40000);
        BigEndian::write_u16(&mut h[2..4], 80);
        BigEndian::write_u32(&mut h[4..8], 1);
        BigEndian::write_u32(&mut h[8..12], 0);
        h[12] = 5 << 4;
        h[13] = tcp_flags::SYN;
        h
    }

    #[test]
    fn reverse_rst_matches_scenario_s7() {
        let raw = syn_header();
        let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
        let state = EncodeState {
            original: TcpHeaderSlice::new(&raw),
            original_dsize: 0,
            ip,
            encode_type: EncodeType::Rst,
            direction: Direction::Reverse,
            interface: Interface::Passive,
            payload: None,
            seq_delta: None,
        };
        let mut out = [0u8; TCP_HEADER_LEN];
        let n = encode(&state, &mut out).unwrap();
        assert_eq!(n, TCP_HEADER_LEN);

        let response = TcpHeaderSlice::new(&out);
        assert_eq!(response.source_port(), 80);
        assert_eq!(response.destination_port(), 40000);
        assert_eq!(response.flags_raw(), tcp_flags::RST | tcp_flags::ACK);
        assert_eq!(response.sequence_number(), 0);
        assert_eq!(response.acknowledgment_number(), 1u32.wrapping_add(1));
        assert_eq!(response.data_offset(), 5);

        let reversed_ip = ip.reversed();
        let pseudo = reversed_ip.pseudo_header(TCP_HEADER_LEN);
        assert_eq!(checksum_segments(&pseudo, &[&out]), 0);
    }

    #[test]
    fn forward_inline_leaves_sequence_untouched() {
        let raw = syn_header();
        let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
        let state = EncodeState {
            original: TcpHeaderSlice::new(&raw),
            original_dsize: 12,
            ip,
            encode_type: EncodeType::Rst,
            direction: Direction::Forward,
            interface: Interface::Inline,
            payload: None,
            seq_delta: None,
        };
        let mut out = [0u8; TCP_HEADER_LEN];
        encode(&state, &mut out).unwrap();
        let response = TcpHeaderSlice::new(&out);
        assert_eq!(response.sequence_number(), 1);
    }

    #[test]
    fn forward_passive_advances_sequence_by_dsize_and_ctl() {
        let raw = syn_header();
        let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
        let state = EncodeState {
            original: TcpHeaderSlice::new(&raw),
            original_dsize: 12,
            ip,
            encode_type: EncodeType::Rst,
            direction: Direction::Forward,
            interface: Interface::Passive,
            payload: None,
            seq_delta: None,
        };
        let mut out = [0u8; TCP_HEADER_LEN];
        encode(&state, &mut out).unwrap();
        let response = TcpHeaderSlice::new(&out);
        assert_eq!(response.sequence_number(), 1 + 12 + 1);
    }

    #[test]
    fn buffer_too_small_is_rejected() {
        let raw = syn_header();
        let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
        let state = EncodeState {
            original: TcpHeaderSlice::new(&raw),
            original_dsize: 0,
            ip,
            encode_type: EncodeType::Push,
            direction: Direction::Forward,
            interface: Interface::Inline,
            payload: Some(&[1, 2, 3, 4, 5]),
            seq_delta: None,
        };
        let mut out = [0u8; TCP_HEADER_LEN];
        assert_eq!(encode(&state, &mut out), Err(EncodeError::BufferOverflow));
    }

    #[test]
    fn update_recomputes_over_full_header_including_options() {
        use crate::config::StaticConfig;
        use crate::events::RecordingEventSink;
        use crate::options::tcp_option;
        use crate::state::PacketState;

        // data_offset 6: 20-byte fixed header + one 4-byte MAXSEG option,
        // followed by a 3-byte payload.
        let mut raw = syn_header().to_vec();
        raw[12] = 6 << 4;
        raw.extend_from_slice(&[tcp_option::KIND_MAXSEG, 4, 0x05, 0xb4]);
        raw.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

        let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);

        let sensor = StaticConfig::passive();
        let mut sink = RecordingEventSink::new();
        let mut pkt = PacketState::new();
        let outcome = crate::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);
        assert!(outcome.ok);
        assert_eq!(pkt.data.len(), 3);

        // a later pipeline stage edits the payload in a separate buffer
        // (raw stays untouched: pkt still borrows from it).
        let mut layer = raw.clone();
        layer[27] = !layer[27];

        let mut len = layer.len();
        assert!(update(&pkt, &ip, &mut layer, &mut len));
        assert_eq!(len, 24 + 3);

        let pseudo = ip.pseudo_header(len);
        assert_eq!(checksum_segments(&pseudo, &[&layer[..24], &layer[24..27]]), 0);
    }

    #[test]
    fn update_fails_when_header_never_decoded() {
        use crate::state::PacketState;

        let ip = IpLayerContext::new(IpAddrCtx::V4([10, 0, 0, 1]), IpAddrCtx::V4([10, 0, 0, 2]), None);
        let pkt = PacketState::new();
        let mut layer = [0u8; TCP_HEADER_LEN];
        let mut len = layer.len();

        assert!(!update(&pkt, &ip, &mut layer, &mut len));
    }
}
