//! UDP transport for client queries.
//!
//! The accept loop captures each client transaction (source address plus
//! query bytes) and hands it to its own local task, so one stalled upstream
//! chain cannot stall the listener. Everything runs on a single thread; the
//! tasks just interleave at await points.

use std::io;
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::net::UdpSocket;

use crate::dns;
use crate::resolver::{QueryAction, Resolver};
use crate::stats::Stats;

use super::MAX_DNS_PACKET_SIZE;

/// UDP listener for the resolver.
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    /// Bind the listening socket.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);

        Ok(Self { socket })
    }

    /// The address the listener actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Start the transport.
    ///
    /// Spawns the accept loop on the current `LocalSet`; each accepted query
    /// gets its own local task.
    pub fn start(self, resolver: Rc<Resolver>, stats: Rc<Stats>) {
        tokio::task::spawn_local(run(self.socket, resolver, stats));
    }
}

/// Accept loop: receive a datagram, spawn a handler, go back to receiving.
async fn run(socket: Arc<UdpSocket>, resolver: Rc<Resolver>, stats: Rc<Stats>) {
    let mut buf = [0u8; MAX_DNS_PACKET_SIZE];

    loop {
        let (len, src) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                error!("UDP receive error: {}", e);
                continue;
            }
        };

        if len < dns::HEADER_LEN {
            debug!("dropping {}-byte datagram from {}", len, src);
            continue;
        }

        let query = buf[..len].to_vec();
        tokio::task::spawn_local(handle_query(
            socket.clone(),
            query,
            src,
            resolver.clone(),
            stats.clone(),
        ));
    }
}

/// One client transaction: block-check, resolve, patch, reply.
///
/// Every failure is logged and the transaction dropped without a reply; the
/// client is expected to time out and retry.
async fn handle_query(
    socket: Arc<UdpSocket>,
    query: Vec<u8>,
    src: SocketAddr,
    resolver: Rc<Resolver>,
    stats: Rc<Stats>,
) {
    let start_time = Instant::now();

    let action = match resolver.process_query(&query) {
        Ok(action) => action,
        Err(e) => {
            stats.record_failed();
            warn!("malformed query from {}: {}", src, e);
            return;
        }
    };

    match action {
        QueryAction::Blocked { response, domain } => {
            let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
            stats.record_blocked(elapsed_ms);
            info!("{} BLOCKED total={:.3}ms", domain, elapsed_ms);
            if let Err(e) = socket.send_to(&response, src).await {
                warn!("reply to {} failed: {}", src, e);
            }
        }
        QueryAction::Resolve { domain } => match resolver.resolve(&query).await {
            Ok(mut response) => {
                dns::patch_as_non_authoritative_answer(&mut response);
                let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
                stats.record_resolved(elapsed_ms);
                info!("{} RESOLVED total={:.3}ms", domain, elapsed_ms);
                if let Err(e) = socket.send_to(&response, src).await {
                    warn!("reply to {} failed: {}", src, e);
                }
            }
            Err(e) => {
                stats.record_failed();
                warn!("{} FAILED: {}", domain, e);
            }
        },
    }
}
