//! TCP option kind constants, the decoded option record, and the
//! options-walk state machine (spec §4.2/§4.3).

mod validate;
mod walker;

pub use validate::{validate_option, ExpectedLen, ValidateOutcome};
pub use walker::{walk_options, OptionWalkResult, WalkFault};

/// Maximum number of option records a single TCP header can carry. Bounded
/// by the 4-bit data offset field: `(15 - 5) * 4 == 40` option bytes, and
/// every option consumes at least one byte.
pub const TCP_OPTLENMAX: usize = 40;

/// A single decoded TCP option.
///
/// `len` is the *payload* length (on-wire length minus the two kind/length
/// bytes), zero for EOL/NOP. `data` borrows directly from the segment's
/// option region and is `None` whenever the on-wire length is exactly 2
/// (kind + length byte, no payload).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionRecord<'a> {
    pub kind: u8,
    pub len: u8,
    pub data: Option<&'a [u8]>,
}

/// `u8` identifiers for TCP option kinds (IANA "TCP Option Kind Numbers"
/// registry, including the long-obsolete/experimental assignments this
/// decoder still has to recognize by number).
pub mod tcp_option {
    pub const KIND_EOL: u8 = 0;
    pub const KIND_NOOP: u8 = 1;
    pub const KIND_MAXSEG: u8 = 2;
    pub const KIND_WSCALE: u8 = 3;
    pub const KIND_SACKOK: u8 = 4;
    pub const KIND_SACK: u8 = 5;
    pub const KIND_ECHO: u8 = 6;
    pub const KIND_ECHOREPLY: u8 = 7;
    pub const KIND_TIMESTAMP: u8 = 8;
    pub const KIND_PARTIAL_ORDER_PERM: u8 = 9;
    pub const KIND_PARTIAL_ORDER_SVC: u8 = 10;
    pub const KIND_CC: u8 = 11;
    pub const KIND_CC_NEW: u8 = 12;
    pub const KIND_CC_ECHO: u8 = 13;
    pub const KIND_ALTCSUM_REQ: u8 = 14;
    pub const KIND_ALTCSUM: u8 = 15;
    pub const KIND_SKEETER: u8 = 16;
    pub const KIND_BUBBA: u8 = 17;
    pub const KIND_TRAILER_CSUM: u8 = 18;
    pub const KIND_MD5SIG: u8 = 19;
    pub const KIND_SCPS: u8 = 20;
    pub const KIND_SELNEGACK: u8 = 21;
    pub const KIND_RECORDBOUND: u8 = 22;
    pub const KIND_CORRUPTION: u8 = 23;
    pub const KIND_SNAP: u8 = 24;
    pub const KIND_UNASSIGNED: u8 = 25;
    pub const KIND_AUTH: u8 = 29;

    /// Window scale values above this are nonsensical (RFC 1323 caps the
    /// shift count at 14).
    pub const WSCALE_MAX: u8 = 14;

    /// Minimum on-wire length of an AUTH (TCP-AO, RFC 5925) option.
    pub const AUTH_MIN_LEN: u8 = 4;
}

/// The three buckets the option walker sorts non-plain kinds into, driving
/// the priority-ordered completion event of spec §4.3.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OptionCategory {
    Plain,
    Obsolete,
    Experimental,
}

pub(crate) fn category(kind: u8) -> OptionCategory {
    use tcp_option::*;
    match kind {
        KIND_ECHO | KIND_ECHOREPLY | KIND_MD5SIG | KIND_SKEETER | KIND_BUBBA | KIND_UNASSIGNED => {
            OptionCategory::Obsolete
        }
        KIND_TRAILER_CSUM
        | KIND_SCPS
        | KIND_SELNEGACK
        | KIND_RECORDBOUND
        | KIND_CORRUPTION
        | KIND_PARTIAL_ORDER_PERM
        | KIND_PARTIAL_ORDER_SVC
        | KIND_ALTCSUM
        | KIND_ALTCSUM_REQ
        | KIND_SNAP => OptionCategory::Experimental,
        KIND_MAXSEG | KIND_WSCALE | KIND_SACKOK | KIND_SACK | KIND_TIMESTAMP | KIND_CC | KIND_CC_NEW
        | KIND_CC_ECHO | KIND_AUTH => OptionCategory::Plain,
        // any kind outside the catalogue above: flag experimental, per the
        // table's "any other -> experimental" row.
        _ => OptionCategory::Experimental,
    }
}

/// Expected on-wire length for a given option kind, per spec §4.3's table.
/// Returns `None` for EOL/NOP, which the walker handles directly without
/// going through the validator.
pub(crate) fn expected_len(kind: u8) -> Option<ExpectedLen> {
    use tcp_option::*;
    match kind {
        KIND_EOL | KIND_NOOP => None,
        KIND_MAXSEG => Some(ExpectedLen::Fixed(4)),
        KIND_WSCALE => Some(ExpectedLen::Fixed(3)),
        KIND_SACKOK => Some(ExpectedLen::Fixed(2)),
        KIND_SACK => Some(ExpectedLen::Variable),
        KIND_ECHO | KIND_ECHOREPLY => Some(ExpectedLen::Fixed(6)),
        KIND_TIMESTAMP => Some(ExpectedLen::Fixed(10)),
        KIND_CC | KIND_CC_NEW | KIND_CC_ECHO => Some(ExpectedLen::Fixed(6)),
        KIND_MD5SIG => Some(ExpectedLen::Fixed(18)),
        KIND_AUTH => Some(ExpectedLen::Variable),
        _ => Some(ExpectedLen::Variable),
    }
}
