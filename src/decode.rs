//! The header decoder (spec §4.4): the main entry point. Bounds-checks
//! the raw segment, verifies its checksum, classifies flag
//! combinations, walks the option region, and fills in the shared
//! packet state.

use crate::checksum::checksum;
use crate::config::Sensor;
use crate::events::{Event, EventSink};
use crate::header::{tcp_flags, TcpHeaderSlice, TCP_HEADER_LEN};
use crate::ip_context::IpLayerContext;
use crate::options::{walk_options, WalkFault, TCP_OPTLENMAX};
use crate::state::PacketState;

/// A signature seen in NAPTHA denial-of-service SYN floods: a fixed
/// sequence number on an otherwise bare SYN segment, paired with a
/// fixed IPv4 identification value.
const NAPTHA_SEQ: u32 = 6_060_842;
const NAPTHA_IP_ID: u16 = 413;

/// The SHAFT distributed denial-of-service tool's fixed SYN-flood
/// sequence number.
const SHAFT_SYN_SEQ: u32 = 674_711_609;

/// Result of decoding one segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodeOutcome {
    /// Whether the segment decoded successfully. `false` means
    /// `pkt.tcph` was cleared and `layer_len` must not be trusted.
    pub ok: bool,
    /// Header length in bytes (`data_offset * 4`), valid only when `ok`.
    pub layer_len: usize,
}

/// Decodes the TCP segment in `raw` against `ip`'s address context,
/// consulting `sensor` for policy and raising anomalies through `sink`.
/// Mutates `pkt` in place; on failure `pkt.tcph` is cleared.
pub fn decode<'a>(
    raw: &'a [u8],
    ip: &IpLayerContext,
    sensor: &dyn Sensor,
    sink: &mut dyn EventSink,
    pkt: &mut PacketState<'a>,
) -> DecodeOutcome {
    // 1. minimum length.
    if raw.len() < TCP_HEADER_LEN {
        sink.emit(Event::DgramLtTcpHdr);
        pkt.clear_header();
        return DecodeOutcome { ok: false, layer_len: 0 };
    }

    // 2. borrow the header, compute the claimed header length.
    let tcph = TcpHeaderSlice::new(raw);
    let layer_len = tcph.data_offset() as usize * 4;

    // 3. the offset must at least cover the fixed header.
    if layer_len < TCP_HEADER_LEN {
        sink.emit(Event::InvalidOffset);
        pkt.clear_header();
        return DecodeOutcome { ok: false, layer_len };
    }

    // 4. the offset must not run past the captured segment.
    if layer_len > raw.len() {
        sink.emit(Event::LargeOffset);
        pkt.clear_header();
        return DecodeOutcome { ok: false, layer_len };
    }

    // 5. checksum verification.
    if sensor.tcp_checksums_enabled() {
        let pseudo = ip.pseudo_header(raw.len());
        if checksum(&pseudo, raw) != 0 {
            if pkt.unsure_encap {
                pkt.clear_header();
                return DecodeOutcome { ok: false, layer_len };
            }
            pkt.checksum_bad = true;
            if sensor.inline_mode() && sensor.tcp_checksum_drops() {
                sensor.drop_active();
            }
        }
    }

    // 6. flag-combination classification.
    let flags = tcph.flags_raw();
    let scan_bits = flags & (tcp_flags::FIN | tcp_flags::PSH | tcp_flags::URG) != 0;
    let control_bits = flags & (tcp_flags::SYN | tcp_flags::ACK | tcp_flags::RST) != 0;
    if scan_bits && control_bits {
        sink.emit(Event::TcpXmas);
    } else if scan_bits {
        sink.emit(Event::TcpNmapXmas);
    }

    if tcph.syn() {
        if flags == tcp_flags::SYN && tcph.sequence_number() == NAPTHA_SEQ && ip.identification == Some(NAPTHA_IP_ID) {
            sink.emit(Event::DosNaptha);
        }
        if sensor.is_multicast_syn_target(&ip.destination) {
            sink.emit(Event::SynToMulticast);
        }
        if tcph.rst() {
            sink.emit(Event::TcpSynRst);
        }
        if tcph.fin() {
            sink.emit(Event::TcpSynFin);
        }
    }

    if !tcph.syn() && !tcph.ack() && !tcph.rst() {
        sink.emit(Event::TcpNoSynAckRst);
    }

    if (tcph.fin() || tcph.psh() || tcph.urg()) && !tcph.ack() {
        sink.emit(Event::TcpMustAck);
    }

    // 7. ports to host byte order (the accessors already do this).
    pkt.source_port = tcph.source_port();
    pkt.destination_port = tcph.destination_port();

    // 8. option walk.
    pkt.options_count = 0;
    if layer_len > TCP_HEADER_LEN {
        let opt_region = &raw[TCP_HEADER_LEN..layer_len];
        let walk = walk_options(opt_region, sink);

        let count = walk.count.min(TCP_OPTLENMAX);
        pkt.options[..count].copy_from_slice(&walk.records[..count]);
        pkt.options_count = count;

        if let Some(WalkFault::RegionTooLong) = walk.fault {
            pkt.clear_header();
            return DecodeOutcome { ok: false, layer_len };
        }

        if walk.fault.is_none() {
            if walk.experimental {
                sink.emit(Event::TcpoptExperimental);
            } else if walk.obsolete {
                sink.emit(Event::TcpoptObsolete);
            } else if walk.ttcp {
                sink.emit(Event::TcpoptTtcp);
            }
        }
    }

    // 9. payload view.
    pkt.data = &raw[layer_len..raw.len()];
    let dsize = pkt.data.len();

    // 10. urgent pointer sanity.
    if tcph.urg() && (dsize == 0 || tcph.urgent_pointer() as usize > dsize) {
        sink.emit(Event::TcpBadUrp);
    }

    // 11. assert the protocol bit, run the remaining signature checks.
    pkt.tcph = Some(tcph);
    pkt.protocol_tcp = true;

    if flags & tcp_flags::NORESERVED == tcp_flags::SYN && tcph.sequence_number() == SHAFT_SYN_SEQ {
        sink.emit(Event::TcpShaftSynflood);
    }
    if pkt.source_port == 0 || pkt.destination_port == 0 {
        sink.emit(Event::TcpPortZero);
    }

    // 12.
    DecodeOutcome { ok: true, layer_len }
}
