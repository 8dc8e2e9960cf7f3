//! Domain blocking.
//!
//! A query whose question name appears in the block list never goes upstream;
//! the resolution engine answers it locally with a synthetic NXDOMAIN.

mod blocklist;

pub use blocklist::Blocklist;
