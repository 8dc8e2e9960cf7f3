use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use log::error;

use sinkhole::filter::Blocklist;
use sinkhole::server::{self, ServerConfig};

#[derive(Parser)]
#[command(name = "sinkhole")]
#[command(about = "Iterative DNS resolver with domain sinkholing", long_about = None)]
struct Args {
    /// Path to a block-list file, one domain per line
    blocklist: Option<PathBuf>,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Local port to listen on
    #[arg(short, long, default_value = "5300")]
    port: u16,

    /// Seconds to wait for each upstream reply
    #[arg(long, default_value = "5")]
    timeout: u64,
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    let blocklist = match &args.blocklist {
        Some(path) => match Blocklist::from_file(path) {
            Ok(list) => list,
            Err(e) => {
                error!("cannot read block list {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Blocklist::empty(),
    };

    let bind_addr: SocketAddr = match format!("{}:{}", args.bind, args.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid bind address {}:{}: {}", args.bind, args.port, e);
            process::exit(1);
        }
    };

    let config = ServerConfig {
        bind_addr,
        exchange_timeout: Duration::from_secs(args.timeout),
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let local = tokio::task::LocalSet::new();
    local.block_on(&rt, server::run(config, blocklist))
}
