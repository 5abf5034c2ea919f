//! Reply value model
//!
//! One recursive value type for every RESP2 reply the client can return.
//!
//! Every field is always present. Which one carries meaning depends on
//! [`ReplyKind`]; the others hold their zero value:
//!
//! | kind         | text          | integer | length        | elements |
//! |--------------|---------------|---------|---------------|----------|
//! | `Status`     | status line   | 0       | bytes of text | empty    |
//! | `Error`      | error message | 0       | bytes of text | empty    |
//! | `BulkString` | payload       | 0       | bytes of text | empty    |
//! | `Integer`    | empty         | value   | 0             | empty    |
//! | `Nil`        | empty         | 0       | 0             | empty    |
//! | `Array`      | empty         | 0       | element count | elements |
//!
//! `integer == 0` does not tell "the number zero" apart from "no number";
//! check `kind` first.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text of the connection-error sentinel
pub const CONNECTION_ERROR_TEXT: &str = "Connection error";

/// Reply type tag, numbered like the RESP2 reply family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ReplyKind {
    BulkString = 1,
    Array = 2,
    Integer = 3,
    Nil = 4,
    Status = 5,
    Error = 6,
}

impl ReplyKind {
    /// Numeric tag of this kind
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Kind for a numeric tag, if it is one
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(ReplyKind::BulkString),
            2 => Some(ReplyKind::Array),
            3 => Some(ReplyKind::Integer),
            4 => Some(ReplyKind::Nil),
            5 => Some(ReplyKind::Status),
            6 => Some(ReplyKind::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplyKind::BulkString => "BulkString",
            ReplyKind::Array => "Array",
            ReplyKind::Integer => "Integer",
            ReplyKind::Nil => "Nil",
            ReplyKind::Status => "Status",
            ReplyKind::Error => "Error",
        };
        f.write_str(name)
    }
}

/// A decoded server reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub kind: ReplyKind,

    /// Status, error or bulk payload, lossily decoded as UTF-8
    pub text: String,

    pub integer: i64,

    /// Raw payload byte count, or element count for arrays. For binary
    /// payloads this is not `text.len()`.
    pub length: usize,
    pub elements: Vec<Reply>,
}

impl Reply {
    /// Build a reply from its parts. No consistency check against `kind`.
    pub fn create(kind: ReplyKind, text: impl Into<String>, integer: i64, length: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            integer,
            length,
            elements: Vec::new(),
        }
    }

    /// Build a reply that carries elements (array replies)
    pub fn create_with_elements(
        kind: ReplyKind,
        text: impl Into<String>,
        integer: i64,
        length: usize,
        elements: Vec<Reply>,
    ) -> Self {
        Self {
            elements,
            ..Self::create(kind, text, integer, length)
        }
    }

    /// The sentinel returned when the connection is unusable
    pub fn connection_error() -> Self {
        Self::create(
            ReplyKind::Error,
            CONNECTION_ERROR_TEXT,
            0,
            CONNECTION_ERROR_TEXT.len(),
        )
    }

    // -------------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------------

    /// True for every kind except `Error`
    pub fn is_ok(&self) -> bool {
        self.kind != ReplyKind::Error
    }

    pub fn is_error(&self) -> bool {
        self.kind == ReplyKind::Error
    }

    pub fn is_status(&self) -> bool {
        self.kind == ReplyKind::Status
    }

    pub fn is_nil(&self) -> bool {
        self.kind == ReplyKind::Nil
    }

    /// True for bulk strings only; status lines are not strings here
    pub fn is_string(&self) -> bool {
        self.kind == ReplyKind::BulkString
    }

    pub fn is_integer(&self) -> bool {
        self.kind == ReplyKind::Integer
    }

    pub fn is_array(&self) -> bool {
        self.kind == ReplyKind::Array
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    /// Human-readable multi-line rendering, elements indented below
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&format!(
            "{}Reply {{ kind: {}, text: {:?}, integer: {}, length: {} }}\n",
            indent, self.kind, self.text, self.integer, self.length
        ));

        if self.elements.is_empty() {
            return;
        }

        out.push_str(&format!("{}Elements:\n", indent));
        for element in &self.elements {
            element.render_into(out, depth + 1);
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
