//! Raw reply definitions
//!
//! A reply exactly as the codec read it off the wire, before the client
//! normalizes it into a [`Reply`](crate::reply::Reply).

use bytes::Bytes;

use crate::reply::ReplyKind;

/// A decoded but not yet normalized server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    /// Reply type tag
    pub kind: ReplyKind,

    /// String payload; `None` for the null bulk string, integers and arrays
    pub payload: Option<Bytes>,

    /// Integer payload (`Integer` replies only)
    pub integer: i64,

    /// Payload byte length, or element count for arrays
    pub length: usize,

    /// Array elements, decoded to any depth
    pub elements: Vec<RawReply>,
}

impl RawReply {
    pub fn status(line: impl Into<Bytes>) -> Self {
        Self::with_payload(ReplyKind::Status, line.into())
    }

    pub fn error(message: impl Into<Bytes>) -> Self {
        Self::with_payload(ReplyKind::Error, message.into())
    }

    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Self::with_payload(ReplyKind::BulkString, data.into())
    }

    pub fn integer(value: i64) -> Self {
        Self {
            kind: ReplyKind::Integer,
            payload: None,
            integer: value,
            length: 0,
            elements: Vec::new(),
        }
    }

    pub fn nil() -> Self {
        Self {
            kind: ReplyKind::Nil,
            payload: None,
            integer: 0,
            length: 0,
            elements: Vec::new(),
        }
    }

    pub fn array(elements: Vec<RawReply>) -> Self {
        Self {
            kind: ReplyKind::Array,
            payload: None,
            integer: 0,
            length: elements.len(),
            elements,
        }
    }

    fn with_payload(kind: ReplyKind, payload: Bytes) -> Self {
        Self {
            kind,
            length: payload.len(),
            payload: Some(payload),
            integer: 0,
            elements: Vec::new(),
        }
    }
}
