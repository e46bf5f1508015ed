//! A worker owns one connection, paces sends against the target rate,
//! matches responses FIFO, and records latency.
//!
//! This realizes a "one OS thread per worker, readiness-driven event
//! loop, reader takes priority over writer" model as one `tokio` task
//! pair per worker rather than a raw OS thread plus a hand-rolled
//! reactor: a reader task and a writer task, each independently scheduled,
//! linked by an in-order channel. `tokio::io::AsyncReadExt::read_exact`
//! is not cancel-safe, so a single task `select!`-ing between a read and
//! a pacing timer could tear a response in half on cancellation; splitting
//! the halves onto their own tasks sidesteps that entirely. Reader
//! priority falls out of the split for free: the reader task is never
//! held up waiting on the writer, because nothing here ever blocks the
//! reader on the writer's pacing gate.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::sleep_until;

use crate::codec::Request;
use crate::config::Config;
use crate::connection;
use crate::distribution::SizeKeyDistribution;
use crate::generator::Generator;
use crate::stats::StatisticsCollection;

/// Which per-request statistics a completed response updates.
#[derive(Debug, Clone, Copy)]
enum Category {
    Get,
    Set,
}

impl From<&Request> for Category {
    fn from(req: &Request) -> Self {
        match req {
            Request::Get { .. } => Category::Get,
            Request::Set { .. } => Category::Set,
        }
    }
}

struct RequestDescriptor {
    category: Category,
    /// On-wire size of the encoded request (header + extras + key +
    /// value), attributed to `get_request_size`/`set_request_size`.
    size: u32,
    send_time: Instant,
}

/// A running worker's externally visible state: the reporter reads this,
/// the worker's own reader task writes it, both behind the same mutex so
/// the hand-off is atomic with respect to `add_sample`.
pub struct WorkerHandle {
    pub stats: Arc<Mutex<StatisticsCollection>>,
}

/// Open one connection and spawn its reader/writer task pair.
pub async fn spawn(
    index: usize,
    config: Arc<Config>,
    distribution: Option<Arc<SizeKeyDistribution>>,
    template: StatisticsCollection,
) -> anyhow::Result<WorkerHandle> {
    if let Some(cores) = &config.pin_cpus {
        if let Some(&core) = cores.get(index) {
            crate::util::affinity::set_cpu_affinity(&[core])?;
        }
    }

    let stream = connection::open(&config.server, config.enable_nagle).await?;
    let (read_half, write_half) = stream.into_split();
    let stats = Arc::new(Mutex::new(template));

    let (tx, rx) = mpsc::unbounded_channel::<RequestDescriptor>();

    let reader_stats = stats.clone();
    let debug = config.debug;
    tokio::spawn(async move {
        if let Err(err) = reader_loop(read_half, rx, reader_stats, debug).await {
            eprintln!("worker {index} reader fatal: {err:#}");
            std::process::exit(1);
        }
    });

    let interval = config.inter_send_interval();
    let mut generator = Generator::new(
        config.master_seed,
        index as u64,
        distribution,
        config.fraction_gets,
        config.fixed_size,
    );
    tokio::spawn(async move {
        if let Err(err) = writer_loop(write_half, tx, &mut generator, interval, debug).await {
            eprintln!("worker {index} writer fatal: {err:#}");
            std::process::exit(1);
        }
    });

    Ok(WorkerHandle { stats })
}

async fn writer_loop(
    mut writer: tokio::net::tcp::OwnedWriteHalf,
    tx: mpsc::UnboundedSender<RequestDescriptor>,
    generator: &mut Generator,
    interval: Option<std::time::Duration>,
    debug: bool,
) -> anyhow::Result<()> {
    let mut next_send = tokio::time::Instant::now();
    loop {
        if let Some(delta) = interval {
            sleep_until(next_send).await;
            next_send += delta;
        }

        let req = generator.next_request();
        let category = Category::from(&req);
        let send_time = Instant::now();
        let size = connection::send_request(&mut writer, &req, debug).await? as u32;

        if tx.send(RequestDescriptor { category, size, send_time }).is_err() {
            // Reader task exited (and already reported its own fatal
            // error); nothing left for the writer to do.
            return Ok(());
        }
    }
}

async fn reader_loop(
    mut reader: tokio::net::tcp::OwnedReadHalf,
    mut rx: mpsc::UnboundedReceiver<RequestDescriptor>,
    stats: Arc<Mutex<StatisticsCollection>>,
    debug: bool,
) -> anyhow::Result<()> {
    loop {
        let response = connection::recv_response(&mut reader, debug).await?;
        let descriptor = rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("writer task exited before its responses arrived"))?;

        if debug && !response.status.is_success() {
            eprintln!("non-success response status: {:?}", response.status);
        }

        let latency = descriptor.send_time.elapsed().as_secs_f64();
        let mut stats = stats.lock().unwrap();
        stats.add_sample("latency", latency)?;
        match descriptor.category {
            Category::Get => {
                stats.add_sample("get_requests", 1.0)?;
                stats.add_sample("get_request_size", descriptor.size as f64)?;
            }
            Category::Set => {
                stats.add_sample("set_requests", 1.0)?;
                stats.add_sample("set_request_size", descriptor.size as f64)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, HEADER_LEN};
    use crate::stats::new_registered_collection;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A fake server that answers every request with a 0-byte success
    /// value after a fixed delay.
    async fn fake_server(listener: TcpListener, delay: Duration) {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut header = [0u8; HEADER_LEN];
        loop {
            if stream.read_exact(&mut header).await.is_err() {
                return;
            }
            let req_header = codec::decode_response_header(&{
                // reuse the response decoder shape check bypassed below;
                // we just need key_len/extras_len/body_len from the
                // request header, whose layout matches except magic.
                let mut h = header;
                h[0] = codec::MAGIC_RESPONSE;
                h
            })
            .unwrap();
            let body_len = req_header.total_body_len as usize;
            let mut body = vec![0u8; body_len];
            if body_len > 0 {
                stream.read_exact(&mut body).await.unwrap();
            }

            tokio::time::sleep(delay).await;

            let mut resp = Vec::with_capacity(HEADER_LEN);
            resp.push(codec::MAGIC_RESPONSE);
            resp.push(header[1]); // echo opcode
            resp.extend_from_slice(&0u16.to_be_bytes()); // key_len
            resp.push(0); // extras_len
            resp.push(0); // data_type
            resp.extend_from_slice(&0u16.to_be_bytes()); // status = success
            resp.extend_from_slice(&0u32.to_be_bytes()); // total_body_len
            resp.extend_from_slice(&0u32.to_be_bytes()); // opaque
            resp.extend_from_slice(&0u64.to_be_bytes()); // cas
            stream.write_all(&resp).await.unwrap();
        }
    }

    #[tokio::test]
    async fn worker_paces_and_records_latency_against_a_fake_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(fake_server(listener, Duration::from_micros(100)));

        let config = Arc::new(Config {
            server: addr.ip().to_string(),
            workers: 1,
            enable_nagle: false,
            rps: Some(2000.0),
            runtime: None,
            report_interval: 1.0,
            fraction_gets: 1.0,
            fixed_size: 8,
            debug: false,
            distribution_file: None,
            pin_cpus: None,
            master_seed: 1,
        });

        // spawn() dials SERVER_PORT (11211); point connection::open at the
        // fake server's ephemeral port instead by constructing the worker
        // manually from the same pieces spawn() uses.
        let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let stats = Arc::new(Mutex::new(new_registered_collection()));
        let (tx, rx) = mpsc::unbounded_channel();

        let reader_stats = stats.clone();
        tokio::spawn(reader_loop(read_half, rx, reader_stats, false));

        let mut generator = Generator::new(config.master_seed, 0, None, config.fraction_gets, config.fixed_size);
        let interval = config.inter_send_interval();
        tokio::spawn(async move {
            let _ = writer_loop(write_half, tx, &mut generator, interval, false).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;

        let stats = stats.lock().unwrap();
        let get_requests = stats.get("get_requests").unwrap().count();
        let latency = stats.get("latency").unwrap();
        assert!(get_requests > 0, "expected at least one completed request");
        assert_eq!(latency.count(), get_requests);
        assert!(latency.average() >= 50e-6, "average latency should be at least the server delay");

        // GET with the fallback key space ("key:0".."key:9999") has no
        // extras or value: wire size is 24-byte header + key length, i.e.
        // between 29 and 32 bytes, never the fallback `fixed_size` of 8.
        let get_request_size = stats.get("get_request_size").unwrap();
        assert!(get_request_size.min_or_zero() >= 29.0);
        assert!(get_request_size.max_or_zero() <= 32.0);
    }
}
