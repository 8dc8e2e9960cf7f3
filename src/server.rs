//! Server orchestration.
//!
//! Builds the resolver, binds the transport, and runs until killed.

use std::io;
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::Duration;

use log::info;

use crate::filter::Blocklist;
use crate::resolver::{Resolver, ResolverOptions};
use crate::stats::Stats;
use crate::transport::udp::UdpTransport;

/// Configuration for the server.
pub struct ServerConfig {
    /// Local address to bind (e.g. 0.0.0.0:5300).
    pub bind_addr: SocketAddr,
    /// Deadline for each upstream exchange.
    pub exchange_timeout: Duration,
}

/// Run the server with the given configuration and block list.
///
/// Starts the UDP transport on the bind address and resolves all queries
/// iteratively from the root servers. Runs indefinitely.
pub async fn run(config: ServerConfig, blocklist: Blocklist) -> io::Result<()> {
    let options = ResolverOptions {
        exchange_timeout: config.exchange_timeout,
        ..ResolverOptions::default()
    };
    let resolver = Rc::new(Resolver::with_options(blocklist, options));
    let stats = Rc::new(Stats::new());

    let udp = UdpTransport::bind(config.bind_addr).await?;
    info!(
        "listening on {} ({} domains blocked)",
        config.bind_addr,
        resolver.blocked_count()
    );

    udp.start(resolver, stats.clone());

    // Report stats every minute
    tokio::task::spawn_local(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;
            let snapshot = stats.snapshot_and_reset();
            info!(
                "stats: received={} resolved={} blocked={} failed={} avg_response={:.2}ms",
                snapshot.received,
                snapshot.resolved,
                snapshot.blocked,
                snapshot.failed,
                snapshot.avg_response_ms
            );
        }
    });

    // Keep running forever
    std::future::pending::<()>().await;

    Ok(())
}
