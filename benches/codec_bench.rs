//! Benchmarks for the DNS wire-format codec.
//!
//! Measures name decoding and the authority-section walk on a realistic
//! referral message.

use criterion::{BenchmarkId, Criterion, Throughput, black_box};

use sinkhole::dns;

fn build_query(domain: &str) -> Vec<u8> {
    let mut query = Vec::with_capacity(512);

    // Header (12 bytes)
    query.extend_from_slice(&[0xab, 0xcd]); // Transaction ID
    query.extend_from_slice(&[0x01, 0x00]); // Flags: standard query
    query.extend_from_slice(&[0x00, 0x01]); // Questions: 1
    query.extend_from_slice(&[0x00, 0x00]); // Answer RRs: 0
    query.extend_from_slice(&[0x00, 0x00]); // Authority RRs: 0
    query.extend_from_slice(&[0x00, 0x00]); // Additional RRs: 0

    query.extend_from_slice(&dns::encode_name(domain));
    query.extend_from_slice(&[0x00, 0x01]); // Type: A
    query.extend_from_slice(&[0x00, 0x01]); // Class: IN

    query
}

/// A root-style referral: the query echoed back with one NS authority record
/// whose RDATA name compresses its `net` tail against the question.
fn build_referral(query: &[u8]) -> Vec<u8> {
    let mut reply = query.to_vec();
    reply[2] = 0x80; // Response flag
    reply[9] = 0x01; // Authority RRs: 1

    // Owner: pointer to the question's "net" label, then NS, IN, TTL 172800
    reply.extend_from_slice(&[0xc0, 0x14, 0x00, 0x02, 0x00, 0x01, 0x00, 0x02, 0xa3, 0x00]);
    let mut rdata = dns::encode_name("a.gtld-servers");
    rdata.pop(); // replace the terminator with a pointer into the question
    rdata.extend_from_slice(&[0xc0, 0x14]);
    reply.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    reply.extend_from_slice(&rdata);

    reply
}

fn bench_codec(c: &mut Criterion) {
    let query = build_query("example.net");
    let referral = build_referral(&query);

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Elements(1));

    group.bench_function(BenchmarkId::new("decode_name", "question"), |b| {
        b.iter(|| dns::decode_name(black_box(&query), 12))
    });

    group.bench_function(BenchmarkId::new("encode_name", "three_labels"), |b| {
        b.iter(|| dns::encode_name(black_box("a.gtld-servers.net")))
    });

    group.bench_function(BenchmarkId::new("referral_target", "compressed_ns"), |b| {
        b.iter(|| dns::referral_target(black_box(&referral)))
    });

    group.finish();
}

fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    bench_codec(&mut criterion);
    criterion.final_summary();
}
