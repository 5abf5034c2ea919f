//! Protocol Module
//!
//! RESP2 command encoding and raw reply decoding.
//!
//! ## Request
//! A command line is split on spaces and sent as a multibulk array of bulk
//! strings.
//!
//! ## Reply Types
//! - `+` Status
//! - `-` Error
//! - `:` Integer
//! - `$` Bulk string (`$-1` is Nil)
//! - `*` Array (`*-1` is Nil)

mod command;
mod response;
mod codec;

pub use command::Command;
pub use response::RawReply;
pub use codec::{
    decode_reply, encode_command, read_reply, write_command, MAX_ARRAY_LEN, MAX_BULK_LEN,
    MAX_LINE_LEN, MAX_MESSAGE_LEN, MAX_NESTING,
};
