//! Codec Tests
//!
//! Tests for command tokenization, command encoding and raw reply decoding.

use std::io::Cursor;

use kvwire::error::WireError;
use kvwire::network::normalize;
use kvwire::protocol::{
    decode_reply, encode_command, read_reply, write_command, Command, RawReply, MAX_NESTING,
};
use kvwire::ReplyKind;
use proptest::prelude::*;

// =============================================================================
// Command Tokenization Tests
// =============================================================================

#[test]
fn test_parse_splits_on_spaces() {
    let cmd = Command::parse("SET a 1");
    assert_eq!(cmd.len(), 3);
    assert_eq!(cmd.name(), Some(&b"SET"[..]));
    assert_eq!(cmd.args()[1].as_ref(), b"a");
    assert_eq!(cmd.args()[2].as_ref(), b"1");
}

#[test]
fn test_parse_collapses_repeated_spaces() {
    let cmd = Command::parse("  GET   key  ");
    assert_eq!(cmd.len(), 2);
    assert_eq!(cmd.args()[0].as_ref(), b"GET");
    assert_eq!(cmd.args()[1].as_ref(), b"key");
}

#[test]
fn test_parse_keeps_quotes_literally() {
    // Quotes are not interpreted: the argument keeps them
    let cmd = Command::parse("eval \"1+1\"");
    assert_eq!(cmd.len(), 2);
    assert_eq!(cmd.args()[1].as_ref(), b"\"1+1\"");

    // and a quoted phrase is still split on its space
    let cmd = Command::parse("SET greeting \"hello world\"");
    assert_eq!(cmd.len(), 4);
    assert_eq!(cmd.args()[2].as_ref(), b"\"hello");
    assert_eq!(cmd.args()[3].as_ref(), b"world\"");
}

#[test]
fn test_parse_empty_line() {
    assert!(Command::parse("").is_empty());
    assert!(Command::parse("    ").is_empty());
    assert_eq!(Command::parse("").name(), None);
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_command_multibulk() {
    let encoded = encode_command(&Command::parse("set a 1"));
    assert_eq!(&encoded[..], b"*3\r\n$3\r\nset\r\n$1\r\na\r\n$1\r\n1\r\n");
}

#[test]
fn test_encode_command_from_args_binary() {
    let cmd = Command::from_args(vec![b"SET".to_vec(), b"k".to_vec(), vec![0x00, 0xFF, b' ']]);
    let encoded = encode_command(&cmd);
    assert_eq!(&encoded[..], b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$3\r\n\x00\xff \r\n");
}

#[test]
fn test_encode_empty_command() {
    let encoded = encode_command(&Command::parse(""));
    assert_eq!(&encoded[..], b"*0\r\n");
}

#[test]
fn test_write_command_to_stream() {
    let mut out = Vec::new();
    write_command(&mut out, &Command::parse("PING")).unwrap();
    assert_eq!(out, b"*1\r\n$4\r\nPING\r\n");
}

#[test]
fn test_encoded_command_decodes_as_array_of_bulks() {
    let encoded = encode_command(&Command::parse("HSET myhash field1 Hello"));
    let decoded = decode_reply(&encoded).unwrap();

    assert_eq!(decoded.kind, ReplyKind::Array);
    assert_eq!(decoded.length, 4);
    let args: Vec<_> = decoded
        .elements
        .iter()
        .map(|e| e.payload.clone().unwrap())
        .collect();
    assert_eq!(args, vec!["HSET", "myhash", "field1", "Hello"]);
}

// =============================================================================
// Reply Decoding Tests
// =============================================================================

#[test]
fn test_decode_status() {
    let reply = decode_reply(b"+OK\r\n").unwrap();
    assert_eq!(reply, RawReply::status("OK"));
    assert_eq!(reply.length, 2);
}

#[test]
fn test_decode_error() {
    let reply = decode_reply(b"-ERR unknown command 'foo'\r\n").unwrap();
    assert_eq!(reply.kind, ReplyKind::Error);
    assert_eq!(reply.payload.as_deref(), Some(&b"ERR unknown command 'foo'"[..]));
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode_reply(b":42\r\n").unwrap(), RawReply::integer(42));
    assert_eq!(decode_reply(b":-7\r\n").unwrap(), RawReply::integer(-7));

    let zero = decode_reply(b":0\r\n").unwrap();
    assert_eq!(zero.kind, ReplyKind::Integer);
    assert_eq!(zero.payload, None);
    assert_eq!(zero.length, 0);
}

#[test]
fn test_decode_bulk_string() {
    let reply = decode_reply(b"$5\r\nhello\r\n").unwrap();
    assert_eq!(reply, RawReply::bulk("hello"));
    assert_eq!(reply.length, 5);
}

#[test]
fn test_decode_bulk_with_crlf_inside() {
    let reply = decode_reply(b"$4\r\na\r\nb\r\n").unwrap();
    assert_eq!(reply.payload.as_deref(), Some(&b"a\r\nb"[..]));
}

#[test]
fn test_decode_empty_bulk_is_not_nil() {
    let reply = decode_reply(b"$0\r\n\r\n").unwrap();
    assert_eq!(reply.kind, ReplyKind::BulkString);
    assert_eq!(reply.payload.as_deref(), Some(&b""[..]));
}

#[test]
fn test_decode_null_bulk_and_null_array() {
    assert_eq!(decode_reply(b"$-1\r\n").unwrap(), RawReply::nil());
    assert_eq!(decode_reply(b"*-1\r\n").unwrap(), RawReply::nil());
}

#[test]
fn test_decode_mixed_array() {
    let reply = decode_reply(b"*4\r\n+OK\r\n:3\r\n$-1\r\n$3\r\nfoo\r\n").unwrap();
    assert_eq!(
        reply,
        RawReply::array(vec![
            RawReply::status("OK"),
            RawReply::integer(3),
            RawReply::nil(),
            RawReply::bulk("foo"),
        ])
    );
    assert_eq!(reply.length, 4);
}

#[test]
fn test_decode_nested_array_keeps_all_levels() {
    let reply = decode_reply(b"*2\r\n*2\r\n:1\r\n:2\r\n$1\r\nx\r\n").unwrap();
    assert_eq!(reply.elements[0].kind, ReplyKind::Array);
    assert_eq!(reply.elements[0].elements.len(), 2);
    assert_eq!(reply.elements[1], RawReply::bulk("x"));
}

#[test]
fn test_decode_empty_array() {
    let reply = decode_reply(b"*0\r\n").unwrap();
    assert_eq!(reply.kind, ReplyKind::Array);
    assert!(reply.elements.is_empty());
    assert_eq!(reply.length, 0);
}

#[test]
fn test_read_consecutive_replies_from_stream() {
    let mut reader = Cursor::new(b"+OK\r\n:1\r\n$3\r\nbar\r\n".to_vec());
    assert_eq!(read_reply(&mut reader).unwrap(), RawReply::status("OK"));
    assert_eq!(read_reply(&mut reader).unwrap(), RawReply::integer(1));
    assert_eq!(read_reply(&mut reader).unwrap(), RawReply::bulk("bar"));
    assert!(matches!(read_reply(&mut reader), Err(WireError::ConnectionClosed)));
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_unknown_type_byte() {
    let result = decode_reply(b"?what\r\n");
    assert!(result.unwrap_err().to_string().contains("Unknown reply type byte"));
}

#[test]
fn test_line_without_crlf() {
    let result = decode_reply(b"+OK\n");
    assert!(matches!(result, Err(WireError::Protocol(_))));
}

#[test]
fn test_empty_line() {
    let result = decode_reply(b"\r\n");
    assert!(matches!(result, Err(WireError::Protocol(_))));
}

#[test]
fn test_eof_is_connection_closed() {
    assert!(matches!(decode_reply(b""), Err(WireError::ConnectionClosed)));
    assert!(matches!(decode_reply(b"+OK"), Err(WireError::ConnectionClosed)));
    assert!(matches!(decode_reply(b"$5\r\nhel"), Err(WireError::ConnectionClosed)));
    assert!(matches!(decode_reply(b"*2\r\n:1\r\n"), Err(WireError::ConnectionClosed)));
}

#[test]
fn test_invalid_integer() {
    assert!(matches!(decode_reply(b":abc\r\n"), Err(WireError::Protocol(_))));
    assert!(matches!(decode_reply(b"$x\r\n"), Err(WireError::Protocol(_))));
}

#[test]
fn test_negative_lengths_other_than_nil() {
    let result = decode_reply(b"$-2\r\n");
    assert!(result.unwrap_err().to_string().contains("negative"));
    assert!(matches!(decode_reply(b"*-5\r\n"), Err(WireError::Protocol(_))));
}

#[test]
fn test_bulk_length_limit() {
    let result = decode_reply(b"$999999999999\r\n");
    assert!(result.unwrap_err().to_string().contains("too large"));
}

#[test]
fn test_bulk_missing_terminator() {
    let result = decode_reply(b"$3\r\nfooXY");
    assert!(matches!(result, Err(WireError::Protocol(_))));
}

#[test]
fn test_nesting_limit() {
    let mut ok = Vec::new();
    for _ in 0..MAX_NESTING {
        ok.extend_from_slice(b"*1\r\n");
    }
    ok.extend_from_slice(b":1\r\n");
    assert!(decode_reply(&ok).is_ok());

    let mut too_deep = Vec::new();
    for _ in 0..=MAX_NESTING {
        too_deep.extend_from_slice(b"*1\r\n");
    }
    too_deep.extend_from_slice(b":1\r\n");
    let result = decode_reply(&too_deep);
    assert!(result.unwrap_err().to_string().contains("nesting"));
}

#[test]
fn test_overlong_header_line() {
    let mut line = vec![b'$'];
    line.extend(std::iter::repeat(b'1').take(kvwire::protocol::MAX_LINE_LEN + 10));
    line.extend_from_slice(b"\r\n");
    let result = decode_reply(&line);
    assert!(result.unwrap_err().to_string().contains("exceeds"));
}

#[test]
fn test_long_status_and_error_lines() {
    let message = "x".repeat(kvwire::protocol::MAX_LINE_LEN + 10);

    let reply = decode_reply(format!("-ERR {}\r\n", message).as_bytes()).unwrap();
    assert_eq!(reply.kind, ReplyKind::Error);
    assert_eq!(reply.length, message.len() + 4);

    let reply = decode_reply(format!("+{}\r\n", message).as_bytes()).unwrap();
    assert_eq!(reply.kind, ReplyKind::Status);
    assert_eq!(reply.payload.as_deref(), Some(message.as_bytes()));
}

// =============================================================================
// Decode + Normalize Properties
// =============================================================================

fn wire_scalar() -> impl Strategy<Value = (Vec<u8>, ReplyKind, String, i64, usize)> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,32}".prop_map(|s| {
            (format!("+{}\r\n", s).into_bytes(), ReplyKind::Status, s.clone(), 0, s.len())
        }),
        "[a-zA-Z0-9 ]{0,32}".prop_map(|s| {
            (format!("-{}\r\n", s).into_bytes(), ReplyKind::Error, s.clone(), 0, s.len())
        }),
        "[a-zA-Z0-9 \r\n]{0,64}".prop_map(|s| {
            (
                format!("${}\r\n{}\r\n", s.len(), s).into_bytes(),
                ReplyKind::BulkString,
                s.clone(),
                0,
                s.len(),
            )
        }),
        any::<i64>().prop_map(|n| {
            (format!(":{}\r\n", n).into_bytes(), ReplyKind::Integer, String::new(), n, 0)
        }),
        Just((b"$-1\r\n".to_vec(), ReplyKind::Nil, String::new(), 0, 0)),
    ]
}

proptest! {
    #[test]
    fn prop_scalar_fields_survive_decoding((wire, kind, text, integer, length) in wire_scalar()) {
        let reply = normalize(&decode_reply(&wire).unwrap());
        prop_assert_eq!(reply.kind, kind);
        prop_assert_eq!(reply.text, text);
        prop_assert_eq!(reply.integer, integer);
        prop_assert_eq!(reply.length, length);
        prop_assert!(reply.elements.is_empty());
    }

    #[test]
    fn prop_array_elements_match_raw(items in prop::collection::vec(wire_scalar(), 0..16)) {
        let mut wire = format!("*{}\r\n", items.len()).into_bytes();
        for (bytes, ..) in &items {
            wire.extend_from_slice(bytes);
        }

        let reply = normalize(&decode_reply(&wire).unwrap());
        prop_assert_eq!(reply.kind, ReplyKind::Array);
        prop_assert_eq!(reply.elements.len(), reply.length);
        prop_assert_eq!(reply.length, items.len());
        for (element, (_, kind, text, integer, length)) in reply.elements.iter().zip(&items) {
            prop_assert_eq!(element.kind, *kind);
            prop_assert_eq!(&element.text, text);
            prop_assert_eq!(element.integer, *integer);
            prop_assert_eq!(element.length, *length);
        }
    }

    #[test]
    fn prop_decoding_is_deterministic((wire, ..) in wire_scalar()) {
        let first = normalize(&decode_reply(&wire).unwrap());
        let second = normalize(&decode_reply(&wire).unwrap());
        prop_assert_eq!(first, second);
    }
}
