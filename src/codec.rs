//! Plugin registration surface (spec §6, §9): the capability table a
//! codec exposes to whatever dispatches packets by protocol id, modeled
//! after the source's virtual-dispatch `Codec` base as a plain trait
//! dispatched by table lookup instead.

use crate::config::Sensor;
use crate::decode::{decode, DecodeOutcome};
use crate::encode::{encode, format, update, EncodeError, EncodeState};
use crate::events::{EventSink, RULE_CATALOG};
use crate::ip_context::IpLayerContext;
use crate::ip_number;
use crate::multicast;
use crate::state::PacketState;

pub use crate::multicast::MULTICAST_CIDR_LIST;

/// Name this layer registers itself under.
pub const CODEC_NAME: &str = "tcp";

/// Protocol id this layer registers itself for.
pub const CODEC_PROTOCOL_ID: u8 = ip_number::TCP;

/// The capability set a codec exposes for table-driven dispatch: decode,
/// encode, the checksum-refresh entry point, and the direction-swap
/// helper used when a packet is cloned.
pub trait Codec {
    fn protocol_ids(&self) -> &'static [u8];

    fn decode<'a>(
        &self,
        raw: &'a [u8],
        ip: &IpLayerContext,
        sensor: &dyn Sensor,
        sink: &mut dyn EventSink,
        pkt: &mut PacketState<'a>,
    ) -> DecodeOutcome;

    fn encode(&self, state: &EncodeState<'_>, out: &mut [u8]) -> Result<usize, EncodeError>;

    fn update(&self, pkt: &PacketState<'_>, ip: &IpLayerContext, layer: &mut [u8], len: &mut usize) -> bool;

    fn format(&self, reversed: bool, copy_header: &mut [u8], copy_pkt: &mut PacketState<'_>);
}

/// The TCP codec. Stateless beyond the process-wide multicast variable
/// it binds and releases in `pinit`/`pterm`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpCodec;

impl TcpCodec {
    pub const fn new() -> TcpCodec {
        TcpCodec
    }

    /// The rule-catalogue table this codec registers: one entry per
    /// event id with its textual description.
    pub fn rule_catalog(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        RULE_CATALOG.iter().map(|event| (event.name(), event.description()))
    }
}

impl Codec for TcpCodec {
    fn protocol_ids(&self) -> &'static [u8] {
        &[CODEC_PROTOCOL_ID]
    }

    fn decode<'a>(
        &self,
        raw: &'a [u8],
        ip: &IpLayerContext,
        sensor: &dyn Sensor,
        sink: &mut dyn EventSink,
        pkt: &mut PacketState<'a>,
    ) -> DecodeOutcome {
        decode(raw, ip, sensor, sink, pkt)
    }

    fn encode(&self, state: &EncodeState<'_>, out: &mut [u8]) -> Result<usize, EncodeError> {
        encode(state, out)
    }

    fn update(&self, pkt: &PacketState<'_>, ip: &IpLayerContext, layer: &mut [u8], len: &mut usize) -> bool {
        update(pkt, ip, layer, len)
    }

    fn format(&self, reversed: bool, copy_header: &mut [u8], copy_pkt: &mut PacketState<'_>) {
        format(reversed, copy_header, copy_pkt)
    }
}

/// Life-cycle hook binding this codec's global state. Called once at
/// process start-up, before any packet reaches `decode`.
pub fn pinit() -> Result<(), multicast::MulticastConfigError> {
    multicast::init()
}

/// Life-cycle hook releasing this codec's global state, paired with
/// [`pinit`].
pub fn pterm() {
    multicast::term();
}

/// Unused by this layer: TCP is terminal for the decoding chain here
/// (spec §6), so there is no `next_protocol_id` to surface. Kept as a
/// named constant so callers modeling the full plugin surface have
/// something to bind to.
pub const NEXT_PROTOCOL_ID: Option<u8> = None;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use crate::events::RecordingEventSink;
    use crate::ip_context::IpAddrCtx;

    #[test]
    fn registers_under_tcp_protocol_id() {
        let codec = TcpCodec::new();
        assert_eq!(codec.protocol_ids(), &[6]);
    }

    #[test]
    fn rule_catalog_has_twenty_entries() {
        let codec = TcpCodec::new();
        assert_eq!(codec.rule_catalog().count(), 20);
    }

    #[test]
    fn codec_decode_delegates_to_free_function() {
        pinit().unwrap();
        let codec = TcpCodec::new();
        let raw = [0u8; 5];
        let ip = IpLayerContext::new(IpAddrCtx::V4([1, 2, 3, 4]), IpAddrCtx::V4([5, 6, 7, 8]), None);
        let sensor = StaticConfig::passive();
        let mut sink = RecordingEventSink::new();
        let mut pkt = PacketState::new();
        let outcome = codec.decode(&raw, &ip, &sensor, &mut sink, &mut pkt);
        assert!(!outcome.ok);
        pterm();
    }
}
