//! Sinkhole - an iterative DNS resolver with domain blocking.
//!
//! Accepts DNS queries over UDP, answers blocked names locally with a
//! synthetic NXDOMAIN, and resolves everything else by walking the
//! delegation chain from a root server down to an authoritative answer.
//! This library exposes the codec, filter, and resolution engine for
//! testing and benchmarking.

pub mod dns;
pub mod filter;
pub mod resolver;
pub mod server;
pub mod stats;
pub mod transport;
