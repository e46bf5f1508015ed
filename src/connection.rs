//! One TCP stream to the server, with framed send/receive helpers.
//!
//! The stream is opened here and then immediately split into owned halves
//! (`tokio::net::TcpStream::into_split`) so the reader and writer can live
//! on two independently-scheduled tasks — see `worker` for why that split
//! matters for cancel-safety.

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::codec::{self, Request, Response, HEADER_LEN};

/// memcached's fixed server port.
pub const SERVER_PORT: u16 = 11211;

/// Connect to `host:11211` and optionally enable Nagle (disabled, i.e.
/// `TCP_NODELAY` set, by default — the `-n` flag flips this).
pub async fn open(host: &str, enable_nagle: bool) -> anyhow::Result<TcpStream> {
    let addr = format!("{host}:{SERVER_PORT}");
    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("connecting to {addr}"))?;
    stream
        .set_nodelay(!enable_nagle)
        .context("setting TCP_NODELAY")?;
    Ok(stream)
}

/// Encode `req` and write it in full. Any short write with an error is
/// fatal; `write_all` already loops until the buffer is drained or an
/// error surfaces. Returns the encoded size in bytes (header + extras +
/// key + value), the on-wire request size the `*_request_size` statistics
/// attribute to this request.
pub async fn send_request(
    writer: &mut OwnedWriteHalf,
    req: &Request,
    debug: bool,
) -> anyhow::Result<usize> {
    let bytes = codec::encode_request(req);
    if debug {
        codec::debug_dump("send", &bytes);
    }
    writer.write_all(&bytes).await.context("writing request")?;
    Ok(bytes.len())
}

/// Read one full response: 24-byte header, then whatever body it declares.
/// `read_exact` loops internally over partial reads; a connection close
/// mid-read surfaces as an error here, which the caller propagates as
/// fatal (no per-request timeout, no partial-response recovery).
pub async fn recv_response(reader: &mut OwnedReadHalf, debug: bool) -> anyhow::Result<Response> {
    let mut header_bytes = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header_bytes)
        .await
        .context("reading response header")?;
    if debug {
        codec::debug_dump("recv header", &header_bytes);
    }

    let header = codec::decode_response_header(&header_bytes)?;
    let mut body = vec![0u8; header.total_body_len as usize];
    reader.read_exact(&mut body).await.context("reading response body")?;
    if debug {
        codec::debug_dump("recv body", &body);
    }

    Ok(Response { status: header.status, opaque: header.opaque, body })
}
