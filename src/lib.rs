//! A zero allocation TCP transport-layer decoder & response-segment encoder
//! for a network intrusion-detection sensor.
//!
//! Given a raw byte span positioned at the start of a TCP segment (the IP
//! layer having already resolved source/destination addresses and the L4
//! payload length), this crate:
//!
//! * validates the TCP header and its option list against RFC 793/1144/
//!   1644/2018/3168/5925 rules,
//! * verifies the segment checksum over an IPv4 or IPv6 pseudoheader,
//! * raises anomaly events for malformed headers, known scanner/DoS
//!   signatures, and deprecated/experimental option usage,
//! * can synthesize a TCP RST or FIN/PUSH response segment with a freshly
//!   computed checksum.
//!
//! # Usage
//!
//! First, add the following to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tcpguard = "0.1"
//! ```
//!
//! The decoder is injected with two collaborators: an [`events::EventSink`]
//! that receives anomaly events, and a [`config::Sensor`] that answers
//! inline/passive-mode and checksum policy questions. Decoding mutates a
//! caller-owned [`state::PacketState`] in place and never allocates.
//!
//! ```
//! use tcpguard::config::StaticConfig;
//! use tcpguard::events::RecordingEventSink;
//! use tcpguard::ip_context::{IpAddrCtx, IpLayerContext};
//! use tcpguard::state::PacketState;
//!
//! let ip = IpLayerContext::new(
//!     IpAddrCtx::V4([10, 0, 0, 1]),
//!     IpAddrCtx::V4([10, 0, 0, 2]),
//!     Some(1),
//! );
//! let sensor = StaticConfig::passive();
//! let mut sink = RecordingEventSink::new();
//! let mut pkt = PacketState::new();
//!
//! // too short to even contain a TCP header
//! let raw: [u8; 10] = [0; 10];
//! let outcome = tcpguard::decode::decode(&raw, &ip, &sensor, &mut sink, &mut pkt);
//! assert!(!outcome.ok);
//! ```

pub mod checksum;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod events;
pub mod header;
pub mod ip_context;
pub mod multicast;
pub mod options;
pub mod state;

pub use checksum::{checksum, checksum_segments, PseudoHeader};
pub use codec::{Codec, TcpCodec, CODEC_NAME, CODEC_PROTOCOL_ID, MULTICAST_CIDR_LIST};
pub use config::{PacketHandle, Sensor, StaticConfig};
pub use decode::{decode, DecodeOutcome};
pub use encode::{encode, format, update, Direction, EncodeError, EncodeState, EncodeType, Interface};
pub use events::{Event, EventSink};
pub use header::{tcp_flags, TcpHeaderSlice, TCP_HEADER_LEN};
pub use ip_context::{IpAddrCtx, IpLayerContext};
pub use options::{OptionRecord, TCP_OPTLENMAX};
pub use state::PacketState;

/// `u8` constants for IP protocol numbers consumed by the pseudoheader and
/// plugin registration surface. Only the one this crate cares about is
/// kept; a full IP-layer decoder owns the rest.
pub mod ip_number {
    /// Protocol number for TCP (RFC 793).
    pub const TCP: u8 = 6;
}
