//! Per-packet decoded state (spec §3): the shared record the decoder
//! mutates and the encoder reads back from. Owned by whatever dequeued
//! the packet; the core only ever touches the fields named here.

use crate::header::TcpHeaderSlice;
use crate::options::{OptionRecord, TCP_OPTLENMAX};

/// Decoded (or, on failure, cleared) TCP state for one packet.
///
/// Header and option records borrow from the caller's packet buffer, so
/// this type's lifetime is tied to that buffer — exactly as long as the
/// packet is being processed and no longer.
pub struct PacketState<'a> {
    /// Borrow of the fixed header, or `None` when decode failed (per
    /// invariant 2: on failure the reference is cleared).
    pub tcph: Option<TcpHeaderSlice<'a>>,
    pub source_port: u16,
    pub destination_port: u16,
    pub options: [OptionRecord<'a>; TCP_OPTLENMAX],
    pub options_count: usize,
    /// Segment payload following the header and options.
    pub data: &'a [u8],
    /// Set on successful decode; asserts "this segment is TCP" for
    /// downstream layers.
    pub protocol_tcp: bool,
    /// Set when checksum verification ran and failed, and the packet
    /// was not dropped as decode-fatal (i.e. `unsure_encap` was clear).
    pub checksum_bad: bool,
    /// Input-only: set by the caller before decoding when the current
    /// path lies inside an encapsulation whose integrity can't be
    /// assumed. Consulted, never written, by the decoder.
    pub unsure_encap: bool,
    /// Set by an upstream stage when this packet was synthesised or
    /// modified by the sensor itself rather than received off the wire.
    /// Consulted only by [`crate::encode::update`].
    pub cooked: bool,
    /// Set by an upstream reassembly stage when this packet is a
    /// rebuilt fragment. Consulted only by [`crate::encode::update`].
    pub rebuilt_fragment: bool,
}

impl<'a> PacketState<'a> {
    /// A freshly reset state, as handed to `decode` for a new packet.
    pub fn new() -> PacketState<'a> {
        PacketState {
            tcph: None,
            source_port: 0,
            destination_port: 0,
            options: [OptionRecord::default(); TCP_OPTLENMAX],
            options_count: 0,
            data: &[],
            protocol_tcp: false,
            checksum_bad: false,
            unsure_encap: false,
            cooked: false,
            rebuilt_fragment: false,
        }
    }

    /// The populated prefix of `options`.
    pub fn options(&self) -> &[OptionRecord<'a>] {
        &self.options[..self.options_count]
    }

    /// Clears everything decode-fatal paths must clear (invariant 2):
    /// the header reference, the protocol bit, and the option/data
    /// views. Port fields and `checksum_bad` are left untouched, since
    /// a fatal failure happens before those are ever set for this
    /// packet.
    pub fn clear_header(&mut self) {
        self.tcph = None;
        self.protocol_tcp = false;
        self.options_count = 0;
        self.data = &[];
    }
}

impl<'a> Default for PacketState<'a> {
    fn default() -> PacketState<'a> {
        PacketState::new()
    }
}
