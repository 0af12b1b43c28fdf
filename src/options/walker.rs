//! The option-region walker (spec §4.3): consumes the bytes between the
//! fixed header and the end of the data offset one option at a time,
//! validating each and classifying the segment as a whole.

use crate::events::{Event, EventSink};

use super::{category, expected_len, tcp_option, OptionCategory, OptionRecord, ValidateOutcome, TCP_OPTLENMAX};

/// Why the walk stopped early instead of reaching the end of the option
/// region cleanly (EOL or exhausting the slice).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WalkFault {
    /// An option's length byte did not satisfy the rule for its kind.
    BadLen { kind: u8 },
    /// An option's kind byte sat at the very end of the region, with no
    /// length byte behind it.
    Truncated { kind: u8 },
    /// The option region itself is longer than a header's data offset can
    /// ever express. The caller is expected to treat the whole header as
    /// untrustworthy when this fires.
    RegionTooLong,
}

/// Outcome of walking one segment's option region.
pub struct OptionWalkResult<'a> {
    /// Every option successfully decoded before the walk stopped, in
    /// on-wire order.
    pub records: [OptionRecord<'a>; TCP_OPTLENMAX],
    /// Number of entries in `records` that are populated.
    pub count: usize,
    /// Set if the walk stopped due to a malformed option rather than
    /// running cleanly to EOL or the end of the region.
    pub fault: Option<WalkFault>,
    /// At least one experimental-category option kind was seen.
    pub experimental: bool,
    /// At least one obsolete-category option kind was seen.
    pub obsolete: bool,
    /// At least one T/TCP (CC_ECHO) option kind was seen.
    pub ttcp: bool,
}

/// Walks the option region `opts`, validating and classifying each option
/// in turn and emitting the matching anomaly events through `sink` as it
/// goes.
///
/// `opts` is expected to already be bounded to at most [`TCP_OPTLENMAX`]
/// bytes by the caller (the data offset field can never express more);
/// this is re-checked defensively and reported as [`WalkFault::RegionTooLong`]
/// rather than panicking or silently truncating, since an over-long region
/// here would mean the header decoder computed offsets incorrectly.
pub fn walk_options<'a>(opts: &'a [u8], sink: &mut dyn EventSink) -> OptionWalkResult<'a> {
    let mut result = OptionWalkResult {
        records: [OptionRecord::default(); TCP_OPTLENMAX],
        count: 0,
        fault: None,
        experimental: false,
        obsolete: false,
        ttcp: false,
    };

    if opts.len() > TCP_OPTLENMAX {
        result.fault = Some(WalkFault::RegionTooLong);
        return result;
    }

    let mut rest = opts;

    while !rest.is_empty() {
        let kind = rest[0];

        if kind == tcp_option::KIND_EOL {
            push(&mut result, OptionRecord { kind, len: 0, data: None });
            break;
        }

        if kind == tcp_option::KIND_NOOP {
            push(&mut result, OptionRecord { kind, len: 0, data: None });
            rest = &rest[1..];
            continue;
        }

        // every kind but EOL/NOP (already handled above) has an expected
        // length rule; fall back to variable-length validation for any
        // kind this match doesn't otherwise recognize rather than panicking.
        let expected = expected_len(kind).unwrap_or(super::ExpectedLen::Variable);

        match validate_and_classify(kind, rest, expected, sink) {
            Ok((record, skip)) => {
                push(&mut result, record);
                classify(&mut result, kind);
                rest = &rest[skip as usize..];
            }
            Err(fault) => {
                emit_fault(sink, fault);
                result.fault = Some(fault);
                break;
            }
        }
    }

    result
}

fn push<'a>(result: &mut OptionWalkResult<'a>, record: OptionRecord<'a>) {
    if result.count < TCP_OPTLENMAX {
        result.records[result.count] = record;
        result.count += 1;
    }
}

fn classify(result: &mut OptionWalkResult<'_>, kind: u8) {
    match category(kind) {
        OptionCategory::Plain => {}
        OptionCategory::Obsolete => result.obsolete = true,
        OptionCategory::Experimental => result.experimental = true,
    }
    if kind == tcp_option::KIND_CC_ECHO {
        result.ttcp = true;
    }
}

fn emit_fault(sink: &mut dyn EventSink, fault: WalkFault) {
    match fault {
        WalkFault::BadLen { .. } => sink.emit(Event::TcpoptBadlen),
        WalkFault::Truncated { .. } => sink.emit(Event::TcpoptTruncated),
        WalkFault::RegionTooLong => sink.emit(Event::TcpoptBadlen),
    }
}

fn validate_and_classify<'a>(
    kind: u8,
    opt: &'a [u8],
    expected: super::ExpectedLen,
    sink: &mut dyn EventSink,
) -> Result<(OptionRecord<'a>, u8), WalkFault> {
    match super::validate_option(opt, expected) {
        ValidateOutcome::Truncated => Err(WalkFault::Truncated { kind }),
        ValidateOutcome::BadLen => Err(WalkFault::BadLen { kind }),
        ValidateOutcome::Ok { skip, payload_len, payload } => {
            // SACK carries one or more 8-byte edge pairs; a bare kind+length
            // with no edges at all is malformed, not merely empty.
            if kind == tcp_option::KIND_SACK && payload.is_none() {
                return Err(WalkFault::BadLen { kind });
            }

            // TCP-AO's own format mandates at least one MAC byte beyond the
            // fixed KeyID/RNextKeyID pair; anything shorter than the
            // minimum is malformed regardless of what the generic variable-
            // length rule allowed through.
            if kind == tcp_option::KIND_AUTH && skip < tcp_option::AUTH_MIN_LEN {
                return Err(WalkFault::BadLen { kind });
            }

            if kind == tcp_option::KIND_WSCALE {
                if let Some(data) = payload {
                    if data[0] > tcp_option::WSCALE_MAX {
                        sink.emit(Event::TcpoptWscaleInvalid);
                    }
                }
            }

            Ok((
                OptionRecord {
                    kind,
                    len: payload_len,
                    data: payload,
                },
                skip,
            ))
        }
    }
}
