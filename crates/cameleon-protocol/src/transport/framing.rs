//! Length-prefixed framing for the Cameleon stream protocol.
//!
//! Frame format:
//! ```text
//! ┌────────────────────┬────────────────────────┐
//! │ header (10 bytes)  │   XML-RPC payload      │
//! │ ASCII decimal,     │                        │
//! │ zero-padded        │                        │
//! └────────────────────┴────────────────────────┘
//! ```
//! The header encodes the total packet length *including* the header itself,
//! so the smallest legal header value is 10 (an empty body) and the largest
//! is 9,999,999,999. A reader never has to guess message boundaries.

use tokio::io::{AsyncRead, AsyncReadExt};

use super::map_io_error;
use crate::protocol::error::{CameleonError, Result};

/// Header size in bytes (fixed, exactly 10 decimal digits).
pub const HEADER_LEN: usize = 10;

/// Largest total packet length the 10-digit header can express.
pub const MAX_TOTAL_LEN: u64 = 9_999_999_999;

/// Largest response body this client will buffer (100 MB). The controller
/// never sends frames anywhere near the header's 10-digit ceiling, and the
/// body buffer is allocated from a peer-supplied length.
pub const MAX_BODY_LEN: u64 = 100 * 1024 * 1024;

/// Wrap a payload in a framed packet.
pub fn frame(body: &[u8]) -> Result<Vec<u8>> {
    let header = encode_header(HEADER_LEN as u64 + body.len() as u64)?;
    let mut packet = Vec::with_capacity(HEADER_LEN + body.len());
    packet.extend_from_slice(&header);
    packet.extend_from_slice(body);
    Ok(packet)
}

/// Encode a total packet length as the 10-digit header.
pub fn encode_header(total: u64) -> Result<[u8; HEADER_LEN]> {
    if total > MAX_TOTAL_LEN {
        return Err(CameleonError::FrameTooLarge {
            total,
            max: MAX_TOTAL_LEN,
        });
    }
    let digits = format!("{total:010}");
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(digits.as_bytes());
    Ok(header)
}

/// Read and validate a frame header, returning the body length.
pub async fn read_header<R: AsyncRead + Unpin>(source: &mut R) -> Result<usize> {
    let mut header = [0u8; HEADER_LEN];
    let received = read_fully(source, &mut header, "reading frame header").await?;
    if received < HEADER_LEN {
        return Err(CameleonError::MalformedHeader(format!(
            "stream closed after {received} of {HEADER_LEN} header bytes"
        )));
    }
    if !header.iter().all(u8::is_ascii_digit) {
        return Err(CameleonError::MalformedHeader(format!(
            "non-digit bytes in header {:?}",
            String::from_utf8_lossy(&header)
        )));
    }
    // 10 ASCII digits always fit u64; unwrap-free by construction.
    let total: u64 = std::str::from_utf8(&header)
        .map_err(|_| CameleonError::MalformedHeader("header is not ASCII".to_string()))?
        .parse()
        .map_err(|_| CameleonError::MalformedHeader("header is not a number".to_string()))?;
    if total < HEADER_LEN as u64 {
        return Err(CameleonError::MalformedHeader(format!(
            "header value {total} implies a negative body length"
        )));
    }
    let body_len = total - HEADER_LEN as u64;
    if body_len > MAX_BODY_LEN {
        return Err(CameleonError::OversizeResponse {
            length: body_len,
            max: MAX_BODY_LEN,
        });
    }
    Ok(body_len as usize)
}

/// Read exactly `length` body bytes.
pub async fn read_body<R: AsyncRead + Unpin>(source: &mut R, length: usize) -> Result<Vec<u8>> {
    let mut body = vec![0u8; length];
    let received = read_fully(source, &mut body, "reading frame body").await?;
    if received < length {
        return Err(CameleonError::TruncatedBody {
            expected: length,
            received,
        });
    }
    Ok(body)
}

/// Fill `buf` from the source, stopping early on EOF. Returns the number of
/// bytes actually read so callers can report how far they got.
async fn read_fully<R: AsyncRead + Unpin>(
    source: &mut R,
    buf: &mut [u8],
    context: &str,
) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let count = source
            .read(&mut buf[filled..])
            .await
            .map_err(|e| map_io_error(e, context))?;
        if count == 0 {
            break;
        }
        filled += count;
    }
    Ok(filled)
}
