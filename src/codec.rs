//! memcached binary protocol v1 request/response framing.
//!
//! Header layout is bit-exact against the protocol reference: 24 bytes,
//! big-endian multi-byte fields, body = extras ‖ key ‖ value.

use crate::error::ProtocolError;

pub const MAGIC_REQUEST: u8 = 0x80;
pub const MAGIC_RESPONSE: u8 = 0x81;

pub const OPCODE_GET: u8 = 0x00;
pub const OPCODE_SET: u8 = 0x01;

pub const HEADER_LEN: usize = 24;

/// Flags always sent with a SET (no meaning to the core beyond being a
/// fixed, recognizable value on the wire).
pub const SET_FLAGS: u32 = 0xDEAD_BEEF;
pub const SET_EXPIRY: u32 = 0;

/// Status codes the server may report in a response header. The core
/// records whichever one arrives without acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    KeyNotFound,
    KeyExists,
    ValueTooLarge,
    InvalidArgument,
    NotStored,
    NonNumeric,
    UnknownCommand,
    OutOfMemory,
    Other(u16),
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        match code {
            0x0000 => Status::Success,
            0x0001 => Status::KeyNotFound,
            0x0002 => Status::KeyExists,
            0x0003 => Status::ValueTooLarge,
            0x0004 => Status::InvalidArgument,
            0x0005 => Status::NotStored,
            0x0006 => Status::NonNumeric,
            0x0081 => Status::UnknownCommand,
            0x0082 => Status::OutOfMemory,
            other => Status::Other(other),
        }
    }
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

/// A request awaiting a response, tagged with its send timestamp and
/// category so the worker can route the eventual latency sample.
#[derive(Debug, Clone)]
pub enum Request {
    Get { key: String },
    Set { key: String, value: Vec<u8>, flags: u32, expiry: u32 },
}

impl Request {
    pub fn opcode(&self) -> u8 {
        match self {
            Request::Get { .. } => OPCODE_GET,
            Request::Set { .. } => OPCODE_SET,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Request::Get { key } => key,
            Request::Set { key, .. } => key,
        }
    }

    /// Size of the value this request carries, for the `*_request_size`
    /// statistics (GET requests carry no value of their own, so this is
    /// the size being requested; SET carries the generated payload).
    pub fn value_len(&self) -> usize {
        match self {
            Request::Get { .. } => 0,
            Request::Set { value, .. } => value.len(),
        }
    }
}

/// A decoded response header plus its trailing body bytes.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub opaque: u32,
    pub body: Vec<u8>,
}

struct Header {
    magic: u8,
    opcode: u8,
    key_len: u16,
    extras_len: u8,
    total_body_len: u32,
    opaque: u32,
    cas: u64,
    status_or_reserved: u16,
}

fn write_header(buf: &mut Vec<u8>, h: &Header) {
    buf.push(h.magic);
    buf.push(h.opcode);
    buf.extend_from_slice(&h.key_len.to_be_bytes());
    buf.push(h.extras_len);
    buf.push(0); // data_type
    buf.extend_from_slice(&h.status_or_reserved.to_be_bytes());
    buf.extend_from_slice(&h.total_body_len.to_be_bytes());
    buf.extend_from_slice(&h.opaque.to_be_bytes());
    buf.extend_from_slice(&h.cas.to_be_bytes());
}

/// Encode a request into its deterministic wire bytes. `opaque` and `cas`
/// are always zero.
pub fn encode_request(req: &Request) -> Vec<u8> {
    let key = req.key().as_bytes();
    let (extras, value): (Vec<u8>, &[u8]) = match req {
        Request::Get { .. } => (Vec::new(), &[]),
        Request::Set { value, flags, expiry, .. } => {
            let mut extras = Vec::with_capacity(8);
            extras.extend_from_slice(&flags.to_be_bytes());
            extras.extend_from_slice(&expiry.to_be_bytes());
            (extras, value.as_slice())
        }
    };

    let total_body_len = (extras.len() + key.len() + value.len()) as u32;
    let header = Header {
        magic: MAGIC_REQUEST,
        opcode: req.opcode(),
        key_len: key.len() as u16,
        extras_len: extras.len() as u8,
        total_body_len,
        opaque: 0,
        cas: 0,
        status_or_reserved: 0,
    };

    let mut buf = Vec::with_capacity(HEADER_LEN + total_body_len as usize);
    write_header(&mut buf, &header);
    buf.extend_from_slice(&extras);
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
    buf
}

/// Decoded response header, before the body has been read off the wire.
pub struct ResponseHeader {
    pub extras_len: u8,
    pub key_len: u16,
    pub total_body_len: u32,
    pub opaque: u32,
    pub status: Status,
}

impl ResponseHeader {
    /// Number of bytes of the body that belong to the value, once extras
    /// and key have been accounted for.
    pub fn value_len(&self) -> usize {
        self.total_body_len as usize - self.extras_len as usize - self.key_len as usize
    }
}

/// Parse a 24-byte response header. Fatal if the magic byte is wrong: a
/// misaligned stream can't be recovered from locally.
pub fn decode_response_header(bytes: &[u8; HEADER_LEN]) -> Result<ResponseHeader, ProtocolError> {
    let magic = bytes[0];
    if magic != MAGIC_RESPONSE {
        return Err(ProtocolError::BadMagic(magic));
    }
    let key_len = u16::from_be_bytes([bytes[2], bytes[3]]);
    let extras_len = bytes[4];
    let status = u16::from_be_bytes([bytes[6], bytes[7]]);
    let total_body_len = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let opaque = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    Ok(ResponseHeader {
        extras_len,
        key_len,
        total_body_len,
        opaque,
        status: Status::from(status),
    })
}

/// Hex/ASCII panel for `-d` packet-dump debugging, modeled on the classic
/// `hexdump -C` layout: 16 bytes per row, hex on the left, printable ASCII
/// (or `.`) on the right.
pub fn debug_dump(label: &str, bytes: &[u8]) {
    eprintln!("{label} ({} bytes):", bytes.len());
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let mut hex = String::new();
        let mut ascii = String::new();
        for b in chunk {
            hex.push_str(&format!("{b:02x} "));
            ascii.push(if b.is_ascii_graphic() || *b == b' ' { *b as char } else { '.' });
        }
        eprintln!("  {:04x}  {:<48}  {}", row * 16, hex, ascii);
    }
}
