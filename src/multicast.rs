//! The global multicast-destination variable (spec §5, §9): a small,
//! read-only-after-init CIDR set, bound once at process start from a
//! literal string and consulted without locking from every worker.

use std::fmt;
use std::sync::OnceLock;

use crate::ip_context::IpAddrCtx;

/// The literal CIDR-list string the plugin's `pinit` hook compiles at
/// start-up (spec §6).
pub const MULTICAST_CIDR_LIST: &str = "[232.0.0.0/8,233.0.0.0/8,239.0.0.0/8]";

/// One IPv4 network/prefix pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Ipv4Cidr {
    network: [u8; 4],
    prefix_len: u8,
}

impl Ipv4Cidr {
    fn contains(&self, addr: [u8; 4]) -> bool {
        let mask = if self.prefix_len == 0 {
            0u32
        } else {
            u32::MAX << (32 - self.prefix_len as u32)
        };
        let net = u32::from_be_bytes(self.network) & mask;
        let a = u32::from_be_bytes(addr) & mask;
        net == a
    }
}

struct MulticastSet {
    entries: Vec<Ipv4Cidr>,
}

impl MulticastSet {
    fn contains(&self, addr: [u8; 4]) -> bool {
        self.entries.iter().any(|c| c.contains(addr))
    }
}

/// Failure to compile the multicast variable's literal CIDR list. Fatal
/// at `ginit` per spec §7 — the process should not start if this ever
/// fires against a hand-maintained literal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MulticastConfigError(String);

impl fmt::Display for MulticastConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid multicast CIDR list: {}", self.0)
    }
}

impl std::error::Error for MulticastConfigError {}

static MULTICAST: OnceLock<MulticastSet> = OnceLock::new();

fn parse_octet(s: &str) -> Result<u8, MulticastConfigError> {
    s.parse::<u8>()
        .map_err(|_| MulticastConfigError(format!("bad octet {:?}", s)))
}

fn parse_ipv4(s: &str) -> Result<[u8; 4], MulticastConfigError> {
    let mut parts = s.splitn(4, '.');
    let mut addr = [0u8; 4];
    for slot in addr.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| MulticastConfigError(format!("bad address {:?}", s)))?;
        *slot = parse_octet(part)?;
    }
    if parts.next().is_some() {
        return Err(MulticastConfigError(format!("bad address {:?}", s)));
    }
    Ok(addr)
}

fn parse_cidr(entry: &str) -> Result<Ipv4Cidr, MulticastConfigError> {
    let mut halves = entry.splitn(2, '/');
    let addr = halves
        .next()
        .ok_or_else(|| MulticastConfigError(format!("empty entry in {:?}", entry)))?;
    let prefix = halves
        .next()
        .ok_or_else(|| MulticastConfigError(format!("missing prefix length in {:?}", entry)))?;
    let network = parse_ipv4(addr)?;
    let prefix_len: u8 = prefix
        .parse()
        .map_err(|_| MulticastConfigError(format!("bad prefix length {:?}", prefix)))?;
    if prefix_len > 32 {
        return Err(MulticastConfigError(format!("prefix length out of range: {}", prefix_len)));
    }
    Ok(Ipv4Cidr { network, prefix_len })
}

fn parse_cidr_list(literal: &str) -> Result<MulticastSet, MulticastConfigError> {
    let trimmed = literal.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| MulticastConfigError(format!("missing brackets in {:?}", literal)))?;

    let entries = inner
        .split(',')
        .map(|entry| parse_cidr(entry.trim()))
        .collect::<Result<Vec<_>, _>>()?;

    if entries.is_empty() {
        return Err(MulticastConfigError("empty CIDR list".to_string()));
    }

    Ok(MulticastSet { entries })
}

/// Binds the global multicast variable from [`MULTICAST_CIDR_LIST`].
/// Called once from the plugin's `pinit` life-cycle hook; calling it
/// again after a prior successful call is a no-op (the variable is
/// immutable after first init).
pub fn init() -> Result<(), MulticastConfigError> {
    let parsed = parse_cidr_list(MULTICAST_CIDR_LIST)?;
    let _ = MULTICAST.set(parsed);
    Ok(())
}

/// Releases the global multicast variable. `OnceLock` offers no safe
/// reset on stable Rust, and workers only ever read the variable, so
/// this is a documented no-op paired with `pinit`'s `init` for symmetry
/// with the plugin life-cycle rather than an actual deallocation.
pub fn term() {}

/// Consults the global multicast variable for whether `addr` falls
/// inside one of the configured multicast destination ranges. IPv6
/// addresses always report `false`: the literal list this crate binds
/// is IPv4-only.
pub fn is_multicast_syn_target(addr: &IpAddrCtx) -> bool {
    match addr {
        IpAddrCtx::V4(bytes) => MULTICAST.get().map_or(false, |set| set.contains(*bytes)),
        IpAddrCtx::V6(_) => false,
    }
}
