//! Sensor policy adaptor (spec §4.6): the narrow slice of the embedding
//! sensor's configuration the core queries — never a full config file
//! parser. Opaque to the core beyond this trait.

use crate::encode::Interface;
use crate::ip_context::IpAddrCtx;

/// An opaque reference to the packet currently being processed, passed
/// back into [`Sensor::interface_mode`] so a real sensor can key its
/// answer off per-packet routing state. This crate never inspects its
/// contents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PacketHandle(pub u64);

/// Policy queries the decoder and encoder make against the embedding
/// sensor. Implementations may use interior mutability for
/// `drop_active`, since the core only ever holds a shared reference.
pub trait Sensor {
    /// Whether the sensor is on the data path and may drop or modify
    /// packets, versus passively tapping the wire.
    fn inline_mode(&self) -> bool;
    /// Whether TCP checksum verification should run at all.
    fn tcp_checksums_enabled(&self) -> bool;
    /// Whether a bad TCP checksum should trigger an active drop request
    /// when the sensor is inline.
    fn tcp_checksum_drops(&self) -> bool;
    /// Requests that the current packet be actively dropped.
    fn drop_active(&self);
    /// Consults the global multicast variable for `addr`.
    fn is_multicast_syn_target(&self, addr: &IpAddrCtx) -> bool;
    /// Inline vs passive mode for the given packet, used by the encoder
    /// to choose forward-direction sequence-number arithmetic.
    fn interface_mode(&self, handle: PacketHandle) -> Interface;
}

/// A dependency-free [`Sensor`] with a fixed policy, useful for tests
/// and for embedders whose configuration never changes at runtime.
pub struct StaticConfig {
    pub inline: bool,
    pub checksums_enabled: bool,
    pub checksum_drops: bool,
    pub interface: Interface,
    drop_requested: std::cell::Cell<bool>,
}

impl StaticConfig {
    /// A passive tap: checksums verified, nothing ever dropped.
    pub fn passive() -> StaticConfig {
        StaticConfig {
            inline: false,
            checksums_enabled: true,
            checksum_drops: false,
            interface: Interface::Passive,
            drop_requested: std::cell::Cell::new(false),
        }
    }

    /// An inline sensor that drops on a bad TCP checksum.
    pub fn inline() -> StaticConfig {
        StaticConfig {
            inline: true,
            checksums_enabled: true,
            checksum_drops: true,
            interface: Interface::Inline,
            drop_requested: std::cell::Cell::new(false),
        }
    }

    /// Whether `drop_active` was called since construction (or the last
    /// call to [`StaticConfig::reset_drop_request`]).
    pub fn drop_requested(&self) -> bool {
        self.drop_requested.get()
    }

    pub fn reset_drop_request(&self) {
        self.drop_requested.set(false);
    }
}

impl Sensor for StaticConfig {
    fn inline_mode(&self) -> bool {
        self.inline
    }

    fn tcp_checksums_enabled(&self) -> bool {
        self.checksums_enabled
    }

    fn tcp_checksum_drops(&self) -> bool {
        self.checksum_drops
    }

    fn drop_active(&self) {
        self.drop_requested.set(true);
    }

    fn is_multicast_syn_target(&self, addr: &IpAddrCtx) -> bool {
        crate::multicast::is_multicast_syn_target(addr)
    }

    fn interface_mode(&self, _handle: PacketHandle) -> Interface {
        self.interface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_config_requests_drop() {
        let cfg = StaticConfig::inline();
        assert!(!cfg.drop_requested());
        cfg.drop_active();
        assert!(cfg.drop_requested());
    }

    #[test]
    fn passive_config_defaults() {
        let cfg = StaticConfig::passive();
        assert!(!cfg.inline_mode());
        assert!(cfg.tcp_checksums_enabled());
        assert!(!cfg.tcp_checksum_drops());
        assert_eq!(cfg.interface_mode(PacketHandle(0)), Interface::Passive);
    }
}
