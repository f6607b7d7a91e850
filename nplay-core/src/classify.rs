//! ## nplay-core::classify
//! Direction classification.
//!
//! With a configured local address the decision is an exact address match,
//! destination first. Without one, private-range membership decides: a
//! private source means outgoing, otherwise a private destination means
//! incoming.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::{Ipv4Network, Ipv6Network};

use crate::event::Direction;

// Non-globally-routable IPv4 blocks: RFC 1918, loopback, link-local,
// documentation, benchmarking and reserved ranges.
const PRIVATE_V4: [(Ipv4Addr, u8); 14] = [
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 0, 0, 0), 29),
    (Ipv4Addr::new(192, 0, 0, 170), 31),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(198, 18, 0, 0), 15),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
    (Ipv4Addr::new(255, 255, 255, 255), 32),
];

const PRIVATE_V6: [(Ipv6Addr, u8); 10] = [
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1), 128),
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0), 128),
    // IPv4-mapped.
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0), 96),
    // Discard-only.
    (Ipv6Addr::new(0x100, 0, 0, 0, 0, 0, 0, 0), 64),
    (Ipv6Addr::new(0x2001, 0, 0, 0, 0, 0, 0, 0), 23),
    (Ipv6Addr::new(0x2001, 0x2, 0, 0, 0, 0, 0, 0), 48),
    (Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0), 32),
    (Ipv6Addr::new(0x2001, 0x10, 0, 0, 0, 0, 0, 0), 28),
    // Unique local.
    (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    // Link-local.
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
];

/// Returns true when `addr` is not globally routable: RFC 1918 space,
/// loopback, link-local, unique local and the IANA special-purpose blocks.
pub fn is_private(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|&(net, prefix)| {
            Ipv4Network::new(net, prefix)
                .map(|n| n.contains(ip))
                .unwrap_or(false)
        }),
        IpAddr::V6(ip) => PRIVATE_V6.iter().any(|&(net, prefix)| {
            Ipv6Network::new(net, prefix)
                .map(|n| n.contains(ip))
                .unwrap_or(false)
        }),
    }
}

/// Classifies packets relative to an optional local address.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirectionClassifier {
    local_addr: Option<IpAddr>,
}

impl DirectionClassifier {
    pub fn new(local_addr: Option<IpAddr>) -> Self {
        Self { local_addr }
    }

    pub fn local_addr(&self) -> Option<IpAddr> {
        self.local_addr
    }

    #[inline]
    pub fn classify(&self, src: IpAddr, dst: IpAddr) -> Direction {
        match self.local_addr {
            Some(local) => {
                // Destination is checked first so that src == dst == local is Incoming.
                if dst == local {
                    Direction::Incoming
                } else if src == local {
                    Direction::Outgoing
                } else {
                    Direction::Unknown
                }
            }
            None => {
                if is_private(src) {
                    Direction::Outgoing
                } else if is_private(dst) {
                    Direction::Incoming
                } else {
                    Direction::Unknown
                }
            }
        }
    }
}
