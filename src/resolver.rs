//! Iterative DNS resolution.
//!
//! Handles the core query processing pipeline:
//! 1. Decode the question name and check it against the block list
//! 2. Blocked names get a synthetic NXDOMAIN, with no upstream traffic
//! 3. Everything else is resolved by walking the delegation chain from a
//!    root server, following NS referrals down to a final answer
//!
//! Transports handle client I/O; the resolver owns the upstream exchanges.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use log::debug;
use rand::Rng;
use thiserror::Error;
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::timeout;

use crate::dns::{self, WireError};
use crate::filter::Blocklist;
use crate::transport::MAX_DNS_PACKET_SIZE;

/// Well-known DNS port for upstream queries.
const DNS_PORT: u16 = 53;

/// Referral hops allowed before a lookup is abandoned. Real delegation
/// chains are a handful of hops deep; anything longer is looping.
const MAX_REFERRALS: usize = 16;

/// The 13 well-known root server host names, `a.root-servers.net` through
/// `m.root-servers.net`.
pub fn root_server_hosts() -> Vec<String> {
    (b'a'..=b'm')
        .map(|c| format!("{}.root-servers.net", c as char))
        .collect()
}

/// Errors that abort a resolution. Nothing is retried: the transaction is
/// dropped and the client is left to time out.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An upstream reply could not be read.
    #[error(transparent)]
    Wire(#[from] WireError),
    /// The upstream socket failed to bind, send, or receive.
    #[error("upstream transport: {0}")]
    Io(#[from] io::Error),
    /// Forward host lookup of a referred name server produced no address.
    #[error("no address found for name server {0}")]
    Unresolved(String),
    /// An upstream exchange exceeded its deadline.
    #[error("no reply from {0} within the exchange deadline")]
    Timeout(String),
    /// The referral chain kept going past the hop cap.
    #[error("referral chain exceeded {0} hops")]
    ReferralLimit(usize),
}

/// Action to take for a DNS query.
#[derive(Debug)]
pub enum QueryAction {
    /// The name is on the block list; reply with these bytes and skip
    /// upstream resolution entirely.
    Blocked { response: Vec<u8>, domain: String },
    /// The name is allowed; run the iterative lookup.
    Resolve { domain: String },
}

/// Tunables for the iterative lookup.
///
/// Production runs on the defaults (plus the CLI timeout); tests point
/// `root_hosts` at a scripted local server.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Host names the first hop is picked from, uniformly at random.
    pub root_hosts: Vec<String>,
    /// Port upstream queries are sent to.
    pub upstream_port: u16,
    /// Deadline for each send/receive exchange.
    pub exchange_timeout: Duration,
    /// Referral hops allowed before giving up.
    pub max_referrals: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            root_hosts: root_server_hosts(),
            upstream_port: DNS_PORT,
            exchange_timeout: Duration::from_secs(5),
            max_referrals: MAX_REFERRALS,
        }
    }
}

/// Resolver handles DNS query processing decisions and upstream I/O.
///
/// The block list and options are fixed at construction; a `Resolver` is
/// read-only while serving, so transports can share one instance.
pub struct Resolver {
    blocklist: Blocklist,
    options: ResolverOptions,
}

impl Resolver {
    /// Create a resolver with the given block list and default options.
    pub fn new(blocklist: Blocklist) -> Self {
        Self::with_options(blocklist, ResolverOptions::default())
    }

    pub fn with_options(blocklist: Blocklist, options: ResolverOptions) -> Self {
        Self { blocklist, options }
    }

    /// Returns the number of domains in the block list.
    pub fn blocked_count(&self) -> usize {
        self.blocklist.len()
    }

    /// Decide what to do with a client query.
    ///
    /// This is the transports' entry point. The query must be at least
    /// header-sized; transports drop shorter datagrams before calling in.
    /// Blocked names get their synthetic reply built here, so a blocked
    /// query never touches a socket.
    pub fn process_query(&self, query: &[u8]) -> Result<QueryAction, WireError> {
        let domain = dns::query_name(query)?;

        if self.blocklist.contains(&domain) {
            let mut response = query.to_vec();
            dns::patch_as_name_error(&mut response);
            return Ok(QueryAction::Blocked { response, domain });
        }

        Ok(QueryAction::Resolve { domain })
    }

    /// Walk the delegation chain from a root server down to a final answer.
    ///
    /// The client's query bytes are sent unmodified on every hop; only the
    /// destination changes. While a reply is a referral (NOERROR, no answers,
    /// authority records present), the first NS name in its authority section
    /// is looked up and queried next. The first reply that is not a referral
    /// is returned as-is; header patching is the caller's job.
    pub async fn resolve(&self, query: &[u8]) -> Result<Vec<u8>, ResolveError> {
        // One ephemeral socket serves every hop of this transaction.
        let socket = UdpSocket::bind("0.0.0.0:0").await?;

        let picked = rand::rng().random_range(0..self.options.root_hosts.len());
        let root = &self.options.root_hosts[picked];
        let mut reply = self.exchange(&socket, root, query).await?;

        let mut hops = 0;
        while dns::response_code(&reply) == 0
            && dns::answer_count(&reply) == 0
            && dns::authority_count(&reply) > 0
        {
            let Some(server) = dns::referral_target(&reply)? else {
                // Authority section without an NS record, e.g. a NODATA reply
                // carrying only an SOA. Nothing to follow; the reply is final.
                break;
            };
            if hops == self.options.max_referrals {
                return Err(ResolveError::ReferralLimit(hops));
            }
            hops += 1;
            debug!("referral {} -> {}", hops, server);
            reply = self.exchange(&socket, &server, query).await?;
        }

        Ok(reply)
    }

    /// One upstream round trip: look up `host`, send the query bytes
    /// verbatim, await a header-sized reply. The whole exchange runs under
    /// the configured deadline.
    async fn exchange(
        &self,
        socket: &UdpSocket,
        host: &str,
        query: &[u8],
    ) -> Result<Vec<u8>, ResolveError> {
        let addr = self.lookup(host).await?;

        timeout(self.options.exchange_timeout, async {
            socket.send_to(query, addr).await?;

            let mut buf = [0u8; MAX_DNS_PACKET_SIZE];
            let (len, _) = socket.recv_from(&mut buf).await?;
            if len < dns::HEADER_LEN {
                return Err(ResolveError::Wire(WireError::UnexpectedEnd));
            }
            Ok(buf[..len].to_vec())
        })
        .await
        .map_err(|_| ResolveError::Timeout(host.to_string()))?
    }

    /// Forward host lookup on the configured upstream port.
    async fn lookup(&self, host: &str) -> Result<SocketAddr, ResolveError> {
        lookup_host((host, self.options.upstream_port))
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ResolveError::Unresolved(host.to_string()))
    }
}
