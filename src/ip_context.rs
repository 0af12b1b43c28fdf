//! The narrow interface this crate consumes from the IP-layer decoder
//! (deliberately out of scope per spec §1: "IP-layer decoding ... the core
//! consumes these only through narrow interfaces").
//!
//! The header decoder and encoder need exactly three things from whatever
//! decoded the IP header above them: the source and destination addresses
//! (to build a pseudoheader) and, for IPv4, the identification field (used
//! by the NAPTHA signature in §4.4 step 11).

/// A source or destination address as seen by the IP layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IpAddrCtx {
    V4([u8; 4]),
    V6([u8; 16]),
}

/// The slice of IP-layer state the TCP decoder and encoder are allowed to
/// read. Populated by whatever decoded the IP header; never constructed or
/// mutated by this crate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IpLayerContext {
    pub source: IpAddrCtx,
    pub destination: IpAddrCtx,
    /// IPv4 identification field; `None` for IPv6 (which has no equivalent
    /// outside fragment extension headers, which are not this crate's
    /// concern).
    pub identification: Option<u16>,
}

impl IpLayerContext {
    pub fn new(source: IpAddrCtx, destination: IpAddrCtx, identification: Option<u16>) -> IpLayerContext {
        IpLayerContext {
            source,
            destination,
            identification,
        }
    }

    /// The context as seen by a reversed-direction response segment: source
    /// and destination addresses swapped, identification cleared (a fresh
    /// outbound segment carries no inherited IP id).
    pub fn reversed(&self) -> IpLayerContext {
        IpLayerContext {
            source: self.destination,
            destination: self.source,
            identification: None,
        }
    }

    /// Builds the pseudoheader covering a segment of the given total
    /// length (header + options + payload), matching this context's IP
    /// version.
    pub fn pseudo_header(&self, length: usize) -> crate::checksum::PseudoHeader {
        use crate::checksum::PseudoHeader;
        match (self.source, self.destination) {
            (IpAddrCtx::V4(source), IpAddrCtx::V4(destination)) => PseudoHeader::V4 {
                source,
                destination,
                length: length as u16,
            },
            (IpAddrCtx::V6(source), IpAddrCtx::V6(destination)) => PseudoHeader::V6 {
                source,
                destination,
                length: length as u32,
            },
            _ => {
                // an IP decoder that hands us mismatched address families is
                // a contract violation upstream of this crate; fall back to
                // treating it as IPv4 zero addresses rather than panicking.
                PseudoHeader::V4 {
                    source: [0; 4],
                    destination: [0; 4],
                    length: length as u16,
                }
            }
        }
    }
}
