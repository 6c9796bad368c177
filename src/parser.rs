//! Sequential parser (C7).
//!
//! Phase 2: recursive-descent materializer consuming the [`StructuralIndex`]
//! built by [`crate::index`] plus the raw input bytes. An explicit depth
//! counter enforces [`ParseConfig::max_depth`] at both `object` and `array`
//! entry, per Core §9 ("do not rely on machine stack size" — the recursion
//! here is still genuine Rust recursion, but it is bounded *before* each
//! recursive call rather than relying on a stack-overflow signal).
//!
//! ```text
//! value   := object | array | string | number | 'true' | 'false' | 'null'
//! object  := '{' (string ':' value (',' string ':' value)*)? '}'
//! array   := '[' (value (',' value)*)? ']'
//! ```

#[cfg(not(test))]
use alloc::string::String;
#[cfg(not(test))]
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::config::ParseConfig;
use crate::error::{ParseError, ParseErrorKind};
use crate::index::{self, StructuralIndex};
use crate::number::DecodedNumber;
use crate::simd::{skip_whitespace, StructuralKind};
use crate::text::unicode_escape::decode_unicode_escape;
use crate::text::utf8::validate_utf8;
use crate::value::Value;

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Default single-threaded entry point: `ParseConfig::default()`.
pub fn parse(bytes: &[u8]) -> Result<Value, ParseError> {
    parse_with(bytes, &ParseConfig::default())
}

/// Parses `bytes` with an explicit configuration. Dispatches to the
/// parallel driver (C8) when `config` allows it and the input qualifies;
/// otherwise runs entirely on this thread (C7).
pub fn parse_with(bytes: &[u8], config: &ParseConfig) -> Result<Value, ParseError> {
    validate_document(bytes)?;
    let index = index::build(bytes)?;

    #[cfg(feature = "parallel")]
    {
        if crate::parallel::should_parallelize(bytes, &index, config) {
            return crate::parallel::parse_parallel(bytes, &index, config);
        }
    }

    parse_sequential(bytes, &index, config)
}

/// Validates the wire-format preconditions that apply before structural
/// indexing even begins: UTF-8 well-formedness and BOM rejection (Core
/// §6, Open Question 1).
fn validate_document(bytes: &[u8]) -> Result<(), ParseError> {
    if bytes.starts_with(BOM) {
        return Err(ParseError::located(ParseErrorKind::InvalidSyntax, "leading byte-order mark is not permitted", bytes, 0));
    }
    validate_utf8(bytes).map_err(|e| {
        ParseError::new(
            ParseErrorKind::InvalidUnicode,
            alloc::format!("{}", e.kind),
            crate::error::Position::locate(bytes, e.offset),
        )
    })?;
    Ok(())
}

/// Runs the whole document through the single-threaded recursive-descent
/// parser. Used directly by [`parse_with`] and as the per-worker engine
/// inside [`crate::parallel`].
pub(crate) fn parse_sequential(bytes: &[u8], index: &StructuralIndex, config: &ParseConfig) -> Result<Value, ParseError> {
    let mut cursor = Cursor::new(bytes, &index.entries, config);
    let start = skip_whitespace(bytes, 0);
    if start == bytes.len() {
        return Err(ParseError::located(ParseErrorKind::EmptyInput, "empty input", bytes, 0));
    }
    cursor.byte_pos = start;
    let value = cursor.parse_value()?;
    let end = skip_whitespace(bytes, cursor.byte_pos);
    if end != bytes.len() {
        return Err(ParseError::located(ParseErrorKind::ExtraTokens, "trailing non-whitespace after value", bytes, end));
    }
    Ok(value)
}

/// Shared recursive-descent state: the input bytes, the structural index
/// (as a position-tracked slice), current byte offset, and nesting depth.
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    entries: &'a [(u32, StructuralKind)],
    entry_pos: usize,
    pub(crate) byte_pos: usize,
    depth: usize,
    max_depth: usize,
    max_string_length: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], entries: &'a [(u32, StructuralKind)], config: &ParseConfig) -> Self {
        Self {
            bytes,
            entries,
            entry_pos: 0,
            byte_pos: 0,
            depth: 0,
            max_depth: config.max_depth,
            max_string_length: config.max_string_length,
        }
    }

    /// A `Cursor` scoped to one worker's span of a top-level array: a
    /// contiguous run of entries strictly between two depth-1 separators,
    /// plus the matching byte range.
    pub(crate) fn for_span(bytes: &'a [u8], entries: &'a [(u32, StructuralKind)], byte_pos: usize, config: &ParseConfig) -> Self {
        Self { bytes, entries, entry_pos: 0, byte_pos, depth: 0, max_depth: config.max_depth, max_string_length: config.max_string_length }
    }

    fn peek_entry(&self) -> Option<(u32, StructuralKind)> {
        self.entries.get(self.entry_pos).copied()
    }

    fn err_here(&self, kind: ParseErrorKind, message: impl Into<alloc::string::String>) -> ParseError {
        ParseError::located(kind, message, self.bytes, self.byte_pos)
    }

    /// Skips whitespace and confirms the next structural entry is one of
    /// `kinds` and sits exactly at the resulting byte offset (it always
    /// will, for well-formed input — a mismatch means either entries are
    /// exhausted or something unexpected was found first, both syntax
    /// errors). Consumes the entry and returns its kind.
    fn expect_structural(&mut self, kinds: &[StructuralKind], on_missing: ParseErrorKind) -> Result<StructuralKind, ParseError> {
        let pos = skip_whitespace(self.bytes, self.byte_pos);
        self.byte_pos = pos;
        match self.peek_entry() {
            Some((offset, kind)) if offset as usize == pos && kinds.contains(&kind) => {
                self.entry_pos += 1;
                self.byte_pos = pos + 1;
                Ok(kind)
            }
            Some((offset, _)) if offset as usize == pos => {
                Err(self.err_here(ParseErrorKind::InvalidSyntax, "unexpected structural character"))
            }
            _ => Err(self.err_here(on_missing, "expected structural character")),
        }
    }

    /// Parses one JSON value starting at the current position, advancing
    /// past it.
    pub(crate) fn parse_value(&mut self) -> Result<Value, ParseError> {
        let pos = skip_whitespace(self.bytes, self.byte_pos);
        self.byte_pos = pos;
        match self.bytes.get(pos) {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b't') | Some(b'f') | Some(b'n') => self.parse_literal(),
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number(),
            Some(_) => Err(self.err_here(ParseErrorKind::InvalidSyntax, "unexpected character at start of value")),
            None => Err(self.err_here(ParseErrorKind::UnexpectedEnd, "expected a value")),
        }
    }

    fn enter_container(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.err_here(ParseErrorKind::MaxDepthExceeded, "maximum nesting depth exceeded"));
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_container(&mut self) {
        self.depth -= 1;
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.enter_container()?;
        self.expect_structural(&[StructuralKind::ObjectOpen], ParseErrorKind::UnexpectedEnd)?;

        let mut fields: IndexMap<String, Value> = IndexMap::new();

        let peek_pos = skip_whitespace(self.bytes, self.byte_pos);
        if self.peek_entry().map(|(o, k)| o as usize == peek_pos && k == StructuralKind::ObjectClose).unwrap_or(false) {
            self.entry_pos += 1;
            self.byte_pos = peek_pos + 1;
            self.exit_container();
            return Ok(Value::Object(fields));
        }

        loop {
            let key_pos = skip_whitespace(self.bytes, self.byte_pos);
            if self.peek_entry().map(|(o, k)| o as usize != key_pos || k != StructuralKind::Quote).unwrap_or(true) {
                return Err(self.err_here(ParseErrorKind::InvalidSyntax, "expected object key string"));
            }
            self.byte_pos = key_pos;
            let key = self.parse_string()?;

            self.expect_structural(&[StructuralKind::Colon], ParseErrorKind::InvalidSyntax)?;
            let value = self.parse_value()?;
            fields.insert(key, value); // last-write-wins

            match self.expect_structural(&[StructuralKind::Comma, StructuralKind::ObjectClose], ParseErrorKind::UnexpectedEnd)? {
                StructuralKind::Comma => continue,
                _ => break,
            }
        }

        self.exit_container();
        Ok(Value::Object(fields))
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.enter_container()?;
        self.expect_structural(&[StructuralKind::ArrayOpen], ParseErrorKind::UnexpectedEnd)?;

        let mut items = Vec::new();

        let peek_pos = skip_whitespace(self.bytes, self.byte_pos);
        if self.peek_entry().map(|(o, k)| o as usize == peek_pos && k == StructuralKind::ArrayClose).unwrap_or(false) {
            self.entry_pos += 1;
            self.byte_pos = peek_pos + 1;
            self.exit_container();
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            match self.expect_structural(&[StructuralKind::Comma, StructuralKind::ArrayClose], ParseErrorKind::UnexpectedEnd)? {
                StructuralKind::Comma => continue,
                _ => break,
            }
        }

        self.exit_container();
        Ok(Value::Array(items))
    }

    /// Parses a `(',' value)*` sequence with no enclosing brackets,
    /// stopping exactly at `end_byte`. Used by the parallel driver to
    /// materialize one worker's span of a top-level array.
    pub(crate) fn parse_value_sequence(&mut self, end_byte: usize) -> Result<Vec<Value>, ParseError> {
        let mut items = Vec::new();
        loop {
            items.push(self.parse_value()?);
            let pos = skip_whitespace(self.bytes, self.byte_pos);
            self.byte_pos = pos;
            if pos >= end_byte {
                break;
            }
            self.expect_structural(&[StructuralKind::Comma], ParseErrorKind::InvalidSyntax)?;
        }
        Ok(items)
    }

    /// Consumes the string starting at the current (already-whitespace-
    /// skipped) position, which must be a `"`. Decodes escapes via
    /// [`crate::text::unicode_escape`]; raw UTF-8 validity was already
    /// established for the whole document in [`validate_document`].
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let open = self.byte_pos;
        debug_assert_eq!(self.bytes.get(open), Some(&b'"'));
        self.entry_pos += 1; // past the opening quote

        let (close_offset, close_kind) = self
            .peek_entry()
            .ok_or_else(|| ParseError::located(ParseErrorKind::UnexpectedEnd, "unterminated string", self.bytes, open))?;
        if close_kind != StructuralKind::Quote {
            return Err(self.err_here(ParseErrorKind::UnexpectedEnd, "unterminated string"));
        }
        self.entry_pos += 1; // past the closing quote
        let close = close_offset as usize;

        let content = &self.bytes[open + 1..close];
        let mut out = String::with_capacity(content.len());
        let mut i = 0usize;
        while i < content.len() {
            let b = content[i];
            if b == b'\\' {
                let (decoded, consumed) = self.decode_escape(&content[i + 1..], open + 1 + i + 1)?;
                out.push_str(&decoded);
                i += 1 + consumed;
            } else if b < 0x20 {
                return Err(ParseError::located(
                    ParseErrorKind::InvalidString,
                    "unescaped control character in string",
                    self.bytes,
                    open + 1 + i,
                ));
            } else {
                let start = i;
                while i < content.len() && content[i] != b'\\' && content[i] >= 0x20 {
                    i += 1;
                }
                // SAFETY: the whole document was already validated as
                // UTF-8, and this run contains no escape introducer.
                out.push_str(core::str::from_utf8(&content[start..i]).expect("document-wide UTF-8 validation"));
            }
        }

        if out.len() > self.max_string_length {
            return Err(ParseError::located(ParseErrorKind::InvalidString, "string exceeds max_string_length", self.bytes, open));
        }

        self.byte_pos = close + 1;
        Ok(out)
    }

    /// Decodes one `\...` escape. `rest` is the content immediately after
    /// the backslash; `abs_offset` is that position's absolute byte
    /// offset, for error reporting. Returns the decoded text and the
    /// number of bytes of `rest` consumed (not counting the backslash
    /// itself).
    fn decode_escape(&self, rest: &[u8], abs_offset: usize) -> Result<(String, usize), ParseError> {
        match rest.first() {
            Some(b'"') => Ok((String::from("\""), 1)),
            Some(b'\\') => Ok((String::from("\\"), 1)),
            Some(b'/') => Ok((String::from("/"), 1)),
            Some(b'b') => Ok((String::from("\u{0008}"), 1)),
            Some(b'f') => Ok((String::from("\u{000C}"), 1)),
            Some(b'n') => Ok((String::from("\n"), 1)),
            Some(b'r') => Ok((String::from("\r"), 1)),
            Some(b't') => Ok((String::from("\t"), 1)),
            Some(b'u') => {
                let first_hex = rest.get(1..5).unwrap_or(&[]);
                let second_hex =
                    if rest.get(5..7) == Some(b"\\u") { rest.get(7..11).unwrap_or(&[]) } else { &[] as &[u8] };
                let (code_point, escapes_used) = decode_unicode_escape(first_hex, second_hex).map_err(|_| {
                    ParseError::located(ParseErrorKind::InvalidUnicode, "invalid \\u escape", self.bytes, abs_offset)
                })?;
                let mut s = String::new();
                let mut buf = alloc::vec::Vec::with_capacity(4);
                crate::text::unicode_escape::push_utf8(&mut buf, code_point).ok_or_else(|| {
                    ParseError::located(ParseErrorKind::InvalidUnicode, "code point out of range", self.bytes, abs_offset)
                })?;
                s.push_str(core::str::from_utf8(&buf).expect("encode_code_point produces valid UTF-8"));
                let consumed = if escapes_used == 2 { 1 + 4 + 2 + 4 } else { 1 + 4 };
                Ok((s, consumed))
            }
            Some(_) => Err(ParseError::located(ParseErrorKind::InvalidEscape, "unrecognized escape character", self.bytes, abs_offset)),
            None => Err(ParseError::located(ParseErrorKind::UnexpectedEnd, "truncated escape sequence", self.bytes, abs_offset)),
        }
    }

    fn parse_literal(&mut self) -> Result<Value, ParseError> {
        let pos = self.byte_pos;
        let rest = &self.bytes[pos..];
        let (literal, value): (&[u8], Value) = if rest.starts_with(b"true") {
            (b"true", Value::Boolean(true))
        } else if rest.starts_with(b"false") {
            (b"false", Value::Boolean(false))
        } else if rest.starts_with(b"null") {
            (b"null", Value::Null)
        } else {
            return Err(self.err_here(ParseErrorKind::InvalidLiteral, "invalid literal"));
        };

        let end = pos + literal.len();
        if matches!(self.bytes.get(end), Some(b) if b.is_ascii_alphanumeric() || *b == b'_') {
            return Err(self.err_here(ParseErrorKind::InvalidLiteral, "literal followed by identifier character"));
        }

        self.byte_pos = end;
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let pos = self.byte_pos;
        let (decoded, consumed) = crate::number::decode_number(&self.bytes[pos..])
            .map_err(|e| ParseError::located(ParseErrorKind::InvalidNumber, e.reason, self.bytes, pos))?;
        self.byte_pos = pos + consumed;
        Ok(match decoded {
            DecodedNumber::F64(f) => Value::Number64(f),
            DecodedNumber::I128(i) => Value::Integer128(i),
            DecodedNumber::U128(u) => Value::Unsigned128(u),
            DecodedNumber::Quad(q) => Value::Number128(q),
        })
    }
}
