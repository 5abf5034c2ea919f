//! Protocol codec
//!
//! Encoding of command lines and decoding of raw replies.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! *<argc>\r\n
//! $<len(arg0)>\r\n<arg0>\r\n
//! $<len(arg1)>\r\n<arg1>\r\n
//! ...
//! ```
//!
//! ### Reply Format
//! ```text
//! +<status line>\r\n             Status
//! -<error message>\r\n           Error
//! :<signed integer>\r\n          Integer
//! $<len>\r\n<len bytes>\r\n      BulkString ($-1\r\n is Nil)
//! *<count>\r\n<count replies>    Array      (*-1\r\n is Nil)
//! ```

use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, RawReply};
use crate::error::{Result, WireError};

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

/// Maximum length of a `$`, `*` or `:` header line (64 KB)
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Maximum length of a status or error line, same as a bulk payload
pub const MAX_MESSAGE_LEN: usize = MAX_BULK_LEN;

/// Maximum bulk string payload (512 MB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Maximum number of elements in one array
pub const MAX_ARRAY_LEN: usize = 16 * 1024 * 1024;

/// Maximum array nesting depth
pub const MAX_NESTING: usize = 7;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command as a multibulk array of bulk strings
pub fn encode_command(command: &Command) -> Bytes {
    let args = command.args();
    let capacity = 16 + args.iter().map(|arg| arg.len() + 16).sum::<usize>();

    let mut buf = BytesMut::with_capacity(capacity);
    put_header(&mut buf, b'*', args.len());
    for arg in args {
        put_header(&mut buf, b'$', arg.len());
        buf.put_slice(arg);
        buf.put_slice(CRLF);
    }

    buf.freeze()
}

fn put_header(buf: &mut BytesMut, prefix: u8, len: usize) {
    buf.put_u8(prefix);
    buf.put_slice(len.to_string().as_bytes());
    buf.put_slice(CRLF);
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Decoding
// =============================================================================

/// Decode the first reply in `bytes`
///
/// Trailing bytes after that reply are ignored.
pub fn decode_reply(bytes: &[u8]) -> Result<RawReply> {
    let mut reader = bytes;
    read_reply(&mut reader)
}

/// Read one complete reply from a stream
///
/// Blocks until the reply is complete. EOF before the end of the reply is
/// reported as [`WireError::ConnectionClosed`].
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<RawReply> {
    read_reply_nested(reader, 0)
}

fn read_reply_nested<R: BufRead>(reader: &mut R, depth: usize) -> Result<RawReply> {
    // Status and error lines carry server text and may be long
    let max_len = match reader.fill_buf().map_err(closed_on_eof)?.first().copied() {
        Some(b'+') | Some(b'-') => MAX_MESSAGE_LEN,
        _ => MAX_LINE_LEN,
    };

    let line = Bytes::from(read_line(reader, max_len)?);
    let Some(&prefix) = line.first() else {
        return Err(WireError::Protocol("Empty reply line".to_string()));
    };
    let rest = line.slice(1..);

    match prefix {
        b'+' => Ok(RawReply::status(rest)),
        b'-' => Ok(RawReply::error(rest)),
        b':' => parse_integer(&rest).map(RawReply::integer),
        b'$' => read_bulk(reader, &rest),
        b'*' => read_array(reader, &rest, depth),
        other => Err(WireError::Protocol(format!(
            "Unknown reply type byte: 0x{:02x}",
            other
        ))),
    }
}

/// Read a CRLF-terminated line of at most `max_len` bytes, without the terminator
fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Vec<u8>> {
    let limit = (max_len + CRLF.len()) as u64;
    let mut line = Vec::new();
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut line)?;

    if read == 0 {
        return Err(WireError::ConnectionClosed);
    }

    if !line.ends_with(b"\n") {
        if read as u64 >= limit {
            return Err(WireError::Protocol(format!(
                "Reply line exceeds {} bytes",
                max_len
            )));
        }
        // EOF in the middle of a line
        return Err(WireError::ConnectionClosed);
    }

    if !line.ends_with(CRLF) {
        return Err(WireError::Protocol(
            "Reply line not terminated by CRLF".to_string(),
        ));
    }

    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

fn read_bulk<R: BufRead>(reader: &mut R, header: &[u8]) -> Result<RawReply> {
    let len = parse_integer(header)?;
    if len == -1 {
        return Ok(RawReply::nil());
    }
    let len = checked_len(len, MAX_BULK_LEN, "Bulk string")?;

    let mut data = vec![0u8; len + CRLF.len()];
    read_exact_or_closed(reader, &mut data)?;

    if !data.ends_with(CRLF) {
        return Err(WireError::Protocol(
            "Bulk string not terminated by CRLF".to_string(),
        ));
    }
    data.truncate(len);

    Ok(RawReply::bulk(data))
}

fn read_array<R: BufRead>(reader: &mut R, header: &[u8], depth: usize) -> Result<RawReply> {
    let count = parse_integer(header)?;
    if count == -1 {
        return Ok(RawReply::nil());
    }
    let count = checked_len(count, MAX_ARRAY_LEN, "Array")?;

    if depth >= MAX_NESTING {
        return Err(WireError::Protocol(format!(
            "Array nesting exceeds {} levels",
            MAX_NESTING
        )));
    }

    let mut elements = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        elements.push(read_reply_nested(reader, depth + 1)?);
    }

    Ok(RawReply::array(elements))
}

fn parse_integer(digits: &[u8]) -> Result<i64> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            WireError::Protocol(format!(
                "Invalid integer: {:?}",
                String::from_utf8_lossy(digits)
            ))
        })
}

fn checked_len(len: i64, max: usize, what: &str) -> Result<usize> {
    let len = usize::try_from(len)
        .map_err(|_| WireError::Protocol(format!("{} length {} is negative", what, len)))?;

    if len > max {
        return Err(WireError::Protocol(format!(
            "{} too large: {} (max {})",
            what, len, max
        )));
    }

    Ok(len)
}

fn read_exact_or_closed<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(closed_on_eof)
}

fn closed_on_eof(e: std::io::Error) -> WireError {
    if e.kind() == ErrorKind::UnexpectedEof {
        WireError::ConnectionClosed
    } else {
        WireError::Io(e)
    }
}
