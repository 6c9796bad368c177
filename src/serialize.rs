//! Serializer (C9).
//!
//! Value tree -> JSON bytes, compact or indented. Numbers are rendered
//! with the shortest decimal representation that round-trips; a NaN
//! terminal (see [`crate::number`]) serializes to `null` rather than the
//! non-standard `NaN` token, the one documented deviation from RFC 8259
//! round-tripping (Core §4.9). Strings are scanned in bulk via
//! [`crate::simd::escape_scan`]: a run with no escapable byte is copied
//! verbatim, and the serializer drops to byte-by-byte escaping only for
//! the bytes that actually need it.

#[cfg(not(test))]
use alloc::format;
#[cfg(not(test))]
use alloc::string::String;
#[cfg(not(test))]
use alloc::vec::Vec;

use crate::number::DecimalQuad;
use crate::simd::escape_scan;
use crate::value::Value;

/// Serializes `value` with no whitespace.
pub fn serialize(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out, None, 0);
    out
}

/// Serializes `value` with newlines and `indent_unit` repeated once per
/// nesting level.
pub fn serialize_pretty(value: &Value, indent_unit: &str) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out, Some(indent_unit), 0);
    out
}

fn write_indent(out: &mut Vec<u8>, indent_unit: &str, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(indent_unit.as_bytes());
    }
}

fn write_value(value: &Value, out: &mut Vec<u8>, indent_unit: Option<&str>, depth: usize) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Boolean(true) => out.extend_from_slice(b"true"),
        Value::Boolean(false) => out.extend_from_slice(b"false"),
        Value::Number64(f) => write_f64(*f, out),
        Value::Integer128(i) => out.extend_from_slice(format!("{i}").as_bytes()),
        Value::Unsigned128(u) => out.extend_from_slice(format!("{u}").as_bytes()),
        Value::Number128(q) => write_decimal_quad(*q, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => write_array(items, out, indent_unit, depth),
        Value::Object(fields) => write_object(fields, out, indent_unit, depth),
    }
}

fn write_f64(f: f64, out: &mut Vec<u8>) {
    if f.is_nan() {
        out.extend_from_slice(b"null");
        return;
    }
    // `f64`'s `Display` already produces the shortest decimal literal
    // that round-trips back to the same bits.
    out.extend_from_slice(format!("{f}").as_bytes());
}

fn write_decimal_quad(q: DecimalQuad, out: &mut Vec<u8>) {
    if q.negative {
        out.push(b'-');
    }
    out.extend_from_slice(format!("{}", q.mantissa).as_bytes());
    if q.exponent != 0 {
        out.push(b'e');
        out.extend_from_slice(format!("{}", q.exponent).as_bytes());
    }
}

fn write_array(items: &[Value], out: &mut Vec<u8>, indent_unit: Option<&str>, depth: usize) {
    out.push(b'[');
    if items.is_empty() {
        out.push(b']');
        return;
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        if let Some(unit) = indent_unit {
            write_indent(out, unit, depth + 1);
        }
        write_value(item, out, indent_unit, depth + 1);
    }
    if let Some(unit) = indent_unit {
        write_indent(out, unit, depth);
    }
    out.push(b']');
}

fn write_object(fields: &indexmap::IndexMap<String, Value>, out: &mut Vec<u8>, indent_unit: Option<&str>, depth: usize) {
    out.push(b'{');
    if fields.is_empty() {
        out.push(b'}');
        return;
    }
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        if let Some(unit) = indent_unit {
            write_indent(out, unit, depth + 1);
        }
        write_string(key, out);
        out.push(b':');
        if indent_unit.is_some() {
            out.push(b' ');
        }
        write_value(value, out, indent_unit, depth + 1);
    }
    if let Some(unit) = indent_unit {
        write_indent(out, unit, depth);
    }
    out.push(b'}');
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    let bytes = s.as_bytes();
    let mut pos = 0usize;
    while pos < bytes.len() {
        let safe_end = escape_scan(bytes, pos, bytes.len() - pos);
        out.extend_from_slice(&bytes[pos..safe_end]);
        if safe_end == bytes.len() {
            break;
        }
        write_escaped_byte(bytes[safe_end], out);
        pos = safe_end + 1;
    }
    out.push(b'"');
}

fn write_escaped_byte(b: u8, out: &mut Vec<u8>) {
    match b {
        b'"' => out.extend_from_slice(b"\\\""),
        b'\\' => out.extend_from_slice(b"\\\\"),
        0x08 => out.extend_from_slice(b"\\b"),
        0x0C => out.extend_from_slice(b"\\f"),
        b'\n' => out.extend_from_slice(b"\\n"),
        b'\r' => out.extend_from_slice(b"\\r"),
        b'\t' => out.extend_from_slice(b"\\t"),
        _ => out.extend_from_slice(format!("\\u{b:04x}").as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn scenario_1_round_trips() {
        let v = parse(br#"{"a":1,"b":[true,null,"x"]}"#).unwrap();
        let bytes = serialize(&v);
        let v2 = parse(&bytes).unwrap();
        assert_eq!(v, v2);
    }

    #[test]
    fn nan_serializes_to_null() {
        let v = parse(b"1e5000").unwrap();
        assert_eq!(serialize(&v), b"null");
    }

    #[test]
    fn empty_containers() {
        assert_eq!(serialize(&Value::array(Vec::new())), b"[]");
        assert_eq!(serialize(&Value::object(indexmap::IndexMap::new())), b"{}");
    }

    #[test]
    fn string_escaping() {
        let v = Value::string("a\nb\"c\\d\x01e");
        let bytes = serialize(&v);
        assert_eq!(bytes, b"\"a\\nb\\\"c\\\\d\\u0001e\"");
    }

    #[test]
    fn pretty_indents_nested_structures() {
        let v = parse(br#"{"a":[1,2]}"#).unwrap();
        let bytes = serialize_pretty(&v, "  ");
        let s = core::str::from_utf8(&bytes).unwrap();
        assert!(s.contains("\n  \"a\": ["));
        assert!(s.contains("\n    1,"));
    }

    #[test]
    fn decimal_quad_round_trips_through_reparse() {
        let v = parse(b"1e100").unwrap();
        let bytes = serialize(&v);
        assert_eq!(bytes, b"1e100");
        let v2 = parse(&bytes).unwrap();
        assert_eq!(v, v2);
    }

    #[test]
    fn integer128_round_trips() {
        let v = parse(b"123456789012345678901234567890").unwrap();
        let bytes = serialize(&v);
        let v2 = parse(&bytes).unwrap();
        assert_eq!(v, v2);
    }

    #[test]
    fn surrogate_pair_string_round_trips() {
        let v = parse(b"\"\\uD834\\uDD1E\"").unwrap();
        let bytes = serialize(&v);
        assert_eq!(bytes, [0x22, 0xF0, 0x9D, 0x84, 0x9E, 0x22]);
        let v2 = parse(&bytes).unwrap();
        assert_eq!(v, v2);
    }
}
