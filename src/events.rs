//! The event sink collaborator (spec §4.6) and the bit-exact rule
//! catalogue (spec §6) this decoder raises anomalies against.
//!
//! The decoder/alert dispatcher itself is an external collaborator (spec
//! §1); this crate only defines the narrow `emit` capability it calls
//! through, so tests can substitute a capturing sink in place of whatever
//! the embedding sensor wires up.

use core::fmt;

/// One entry per anomaly this decoder can raise, named to match the rule
/// catalogue's identifiers bit-for-bit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Event {
    DgramLtTcpHdr,
    InvalidOffset,
    LargeOffset,
    TcpoptBadlen,
    TcpoptTruncated,
    TcpoptTtcp,
    TcpoptObsolete,
    TcpoptExperimental,
    TcpoptWscaleInvalid,
    TcpXmas,
    TcpNmapXmas,
    TcpBadUrp,
    TcpSynFin,
    TcpSynRst,
    TcpMustAck,
    TcpNoSynAckRst,
    TcpShaftSynflood,
    TcpPortZero,
    DosNaptha,
    SynToMulticast,
}

impl Event {
    /// The identifier exactly as it appears in the rule catalogue.
    pub fn name(&self) -> &'static str {
        match self {
            Event::DgramLtTcpHdr => "DGRAM_LT_TCPHDR",
            Event::InvalidOffset => "INVALID_OFFSET",
            Event::LargeOffset => "LARGE_OFFSET",
            Event::TcpoptBadlen => "TCPOPT_BADLEN",
            Event::TcpoptTruncated => "TCPOPT_TRUNCATED",
            Event::TcpoptTtcp => "TCPOPT_TTCP",
            Event::TcpoptObsolete => "TCPOPT_OBSOLETE",
            Event::TcpoptExperimental => "TCPOPT_EXPERIMENTAL",
            Event::TcpoptWscaleInvalid => "TCPOPT_WSCALE_INVALID",
            Event::TcpXmas => "TCP_XMAS",
            Event::TcpNmapXmas => "TCP_NMAP_XMAS",
            Event::TcpBadUrp => "TCP_BAD_URP",
            Event::TcpSynFin => "TCP_SYN_FIN",
            Event::TcpSynRst => "TCP_SYN_RST",
            Event::TcpMustAck => "TCP_MUST_ACK",
            Event::TcpNoSynAckRst => "TCP_NO_SYN_ACK_RST",
            Event::TcpShaftSynflood => "TCP_SHAFT_SYNFLOOD",
            Event::TcpPortZero => "TCP_PORT_ZERO",
            Event::DosNaptha => "DOS_NAPTHA",
            Event::SynToMulticast => "SYN_TO_MULTICAST",
        }
    }

    /// The textual description carried in the plugin's rule-catalogue
    /// table (spec §6).
    pub fn description(&self) -> &'static str {
        match self {
            Event::DgramLtTcpHdr => "TCP header length too small for actual TCP header",
            Event::InvalidOffset => "TCP data offset is less than 5",
            Event::LargeOffset => "TCP header length exceeds the length of the captured segment",
            Event::TcpoptBadlen => "TCP option has an invalid length",
            Event::TcpoptTruncated => "TCP options list is truncated",
            Event::TcpoptTtcp => "Obsolete T/TCP option (CC_ECHO) in use",
            Event::TcpoptObsolete => "Obsolete TCP option in use",
            Event::TcpoptExperimental => "Experimental TCP option in use",
            Event::TcpoptWscaleInvalid => "TCP window scale option has an invalid shift count",
            Event::TcpXmas => "TCP Xmas tree scan (multiple control flags combined)",
            Event::TcpNmapXmas => "TCP Nmap Xmas scan (FIN/PSH/URG, no SYN/ACK/RST)",
            Event::TcpBadUrp => "TCP urgent pointer exceeds segment payload size",
            Event::TcpSynFin => "SYN and FIN set in the same TCP segment",
            Event::TcpSynRst => "SYN and RST set in the same TCP segment",
            Event::TcpMustAck => "TCP segment with FIN, PSH or URG but ACK not set",
            Event::TcpNoSynAckRst => "TCP segment with none of SYN, ACK or RST set",
            Event::TcpShaftSynflood => "SHAFT distributed denial-of-service SYN flood signature",
            Event::TcpPortZero => "TCP segment with source or destination port 0",
            Event::DosNaptha => "NAPTHA denial-of-service SYN signature",
            Event::SynToMulticast => "SYN targeting a multicast destination address",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The rule catalogue: one entry per event id with its textual
/// description, exposed for plugin registration (spec §6).
pub const RULE_CATALOG: &[Event] = &[
    Event::DgramLtTcpHdr,
    Event::InvalidOffset,
    Event::LargeOffset,
    Event::TcpoptBadlen,
    Event::TcpoptTruncated,
    Event::TcpoptTtcp,
    Event::TcpoptObsolete,
    Event::TcpoptExperimental,
    Event::TcpoptWscaleInvalid,
    Event::TcpXmas,
    Event::TcpNmapXmas,
    Event::TcpBadUrp,
    Event::TcpSynFin,
    Event::TcpSynRst,
    Event::TcpMustAck,
    Event::TcpNoSynAckRst,
    Event::TcpShaftSynflood,
    Event::TcpPortZero,
    Event::DosNaptha,
    Event::SynToMulticast,
];

/// Fire-and-forget anomaly sink injected into the decoder. The real
/// alert/event dispatcher lives outside this crate (spec §1); this trait
/// is the narrow interface the core calls through.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// A no-op sink, for callers that don't care about anomaly events (e.g.
/// throughput benchmarking harnesses).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: Event) {}
}

/// A capturing sink that records every emitted event in order, for
/// asserting on decoder behaviour in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingEventSink {
    pub events: Vec<Event>,
}

impl RecordingEventSink {
    pub fn new() -> RecordingEventSink {
        RecordingEventSink { events: Vec::new() }
    }

    pub fn contains(&self, event: Event) -> bool {
        self.events.contains(&event)
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_catalog_names_match_spec_identifiers() {
        assert_eq!(Event::DgramLtTcpHdr.name(), "DGRAM_LT_TCPHDR");
        assert_eq!(Event::SynToMulticast.name(), "SYN_TO_MULTICAST");
        assert_eq!(RULE_CATALOG.len(), 20);
    }

    #[test]
    fn recording_sink_preserves_order() {
        let mut sink = RecordingEventSink::new();
        sink.emit(Event::TcpXmas);
        sink.emit(Event::TcpBadUrp);
        assert_eq!(sink.events, vec![Event::TcpXmas, Event::TcpBadUrp]);
    }
}
