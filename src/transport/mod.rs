//! Transport layer for the resolver.
//!
//! One UDP listener receives client queries and sends the replies back.
//! Upstream traffic is not handled here; the resolution engine owns its own
//! per-transaction socket.

pub mod udp;

/// Maximum size of a DNS message over UDP (classic limit, no EDNS0).
pub const MAX_DNS_PACKET_SIZE: usize = 512;
