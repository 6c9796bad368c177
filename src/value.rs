//! Value model (C5).
//!
//! A tagged variant representing the JSON value tree. Ownership is
//! exclusive (a value belongs to its parent container or to the caller);
//! cloning is explicit (`Clone`) and always deep. Wrong-variant scalar
//! accessors never panic — they return a type-appropriate zero, matching
//! the spec's "predicate family is the only sanctioned discriminator"
//! contract; `get`/`get_key` follow the same rule for containers,
//! returning a reference to a shared `Null` sentinel rather than `Option`.

#[cfg(not(test))]
use alloc::borrow::ToOwned;
#[cfg(not(test))]
use alloc::string::String;
#[cfg(not(test))]
use alloc::vec;
#[cfg(not(test))]
use alloc::vec::Vec;

#[cfg(test)]
use std::vec;

use indexmap::IndexMap;

use crate::number::DecimalQuad;

/// The JSON value tree's tagged variant. See module docs for the
/// ownership and accessor contract.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    /// IEEE-754 double; used whenever the source literal fits without loss.
    Number64(f64),
    /// Signed 128-bit integer; selected when 64-bit would lose precision.
    Integer128(i128),
    /// Unsigned 128-bit integer; selected when a positive integer exceeds `i128::MAX`.
    Unsigned128(u128),
    /// 128-bit decimal (sign + mantissa + exponent); selected when a
    /// fraction or exponent overflows the 64-bit fast path.
    Number128(DecimalQuad),
    /// UTF-8 byte sequence (not NUL-terminated).
    String(String),
    /// Dense ordered sequence with O(1) indexed access.
    Array(Vec<Value>),
    /// Key -> value mapping; last-write-wins at insert, so no duplicate
    /// keys ever exist at steady state. Iteration order is insertion
    /// order in the last-write sense, not stable across platforms, so
    /// equality below compares objects as key sets, not sequences.
    Object(IndexMap<String, Value>),
}

static NULL_SENTINEL: Value = Value::Null;

impl Value {
    // -- direct constructors (Core §6) --------------------------------

    pub fn null() -> Self {
        Value::Null
    }

    pub fn boolean(b: bool) -> Self {
        Value::Boolean(b)
    }

    pub fn number64(n: f64) -> Self {
        Value::Number64(n)
    }

    pub fn integer128(n: i128) -> Self {
        Value::Integer128(n)
    }

    pub fn unsigned128(n: u128) -> Self {
        Value::Unsigned128(n)
    }

    pub fn number128(q: DecimalQuad) -> Self {
        Value::Number128(q)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(items)
    }

    pub fn object(fields: IndexMap<String, Value>) -> Self {
        Value::Object(fields)
    }

    // -- predicate family (the only sanctioned discriminator) ---------

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number64(_) | Value::Integer128(_) | Value::Unsigned128(_) | Value::Number128(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// `true` iff this is the tier-3 NaN terminal of the number decoder.
    /// `Number128`/`Integer128`/`Unsigned128` are always finite by
    /// construction and never report `true` here.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number64(f) if f.is_nan())
    }

    // -- scalar extraction (zero-on-mismatch) --------------------------

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            _ => false,
        }
    }

    /// Numeric projection to `f64`. Wrong-variant and 128-bit-to-`f64`
    /// narrowing both use this single lossy path; a `Number64` NaN
    /// terminal simply projects to itself.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Number64(f) => *f,
            Value::Integer128(i) => *i as f64,
            Value::Unsigned128(u) => *u as f64,
            Value::Number128(q) => q.to_f64_lossy(),
            _ => 0.0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::String(s) => s.as_str(),
            _ => "",
        }
    }

    // -- container access (zero/sentinel-on-mismatch) -------------------

    /// O(1) size query: array/object length, string byte length, 0 for
    /// scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Object(fields) => fields.len(),
            Value::String(s) => s.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// O(1) array element access. Out-of-range or non-array access both
    /// return the shared `Null` sentinel rather than panicking.
    pub fn get(&self, index: usize) -> &Value {
        match self {
            Value::Array(items) => items.get(index).unwrap_or(&NULL_SENTINEL),
            _ => &NULL_SENTINEL,
        }
    }

    /// Expected-O(1) object lookup. Missing key or non-object access both
    /// return the shared `Null` sentinel.
    pub fn get_key(&self, key: &str) -> &Value {
        match self {
            Value::Object(fields) => fields.get(key).unwrap_or(&NULL_SENTINEL),
            _ => &NULL_SENTINEL,
        }
    }

    pub fn as_array(&self) -> &[Value] {
        match self {
            Value::Array(items) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Structural equality. Arrays compare order-sensitively; objects compare
/// as key sets plus per-key value equality (Core §9: "insertion order is
/// not preserved across rehash"). `Number64` uses ordinary IEEE-754
/// comparison — `-0.0 == 0.0` (Open Question 2), and two NaN terminals
/// compare unequal like any other `f64` NaN (the documented exception to
/// the round-trip property is the NaN -> `null` serialization itself, not
/// value equality).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number64(a), Value::Number64(b)) => a == b,
            (Value::Integer128(a), Value::Integer128(b)) => a == b,
            (Value::Unsigned128(a), Value::Unsigned128(b)) => a == b,
            (Value::Number128(a), Value::Number128(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|v2| v == v2))
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number64(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

enum BuilderInner {
    Empty,
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// Incremental constructor for `Array`/`Object` values (Core §6). The
/// first call to `set`/`append` fixes the builder's kind; a subsequent
/// call of the other kind is ignored rather than panicking, matching the
/// value model's never-throw accessor philosophy.
pub struct ValueBuilder {
    inner: BuilderInner,
}

impl ValueBuilder {
    pub fn new() -> Self {
        Self { inner: BuilderInner::Empty }
    }

    /// Inserts (or overwrites) a key in the object under construction.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        match &mut self.inner {
            BuilderInner::Empty => {
                let mut fields = IndexMap::new();
                fields.insert(key.into(), value);
                self.inner = BuilderInner::Object(fields);
            }
            BuilderInner::Object(fields) => {
                fields.insert(key.into(), value);
            }
            BuilderInner::Array(_) => {}
        }
        self
    }

    /// Appends an element to the array under construction.
    pub fn append(mut self, value: Value) -> Self {
        match &mut self.inner {
            BuilderInner::Empty => self.inner = BuilderInner::Array(alloc::vec![value]),
            BuilderInner::Array(items) => items.push(value),
            BuilderInner::Object(_) => {}
        }
        self
    }

    /// Terminal: materializes the built value. An untouched builder
    /// yields `Null`.
    pub fn build(self) -> Value {
        match self.inner {
            BuilderInner::Empty => Value::Null,
            BuilderInner::Array(items) => Value::Array(items),
            BuilderInner::Object(fields) => Value::Object(fields),
        }
    }
}

impl Default for ValueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Manual `serde` support (the `serde` feature), matching any
/// self-describing format rather than only this crate's own wire format.
/// [`DecimalQuad`] has no 128-bit-decimal counterpart in serde's data
/// model, so it serializes through its lossy `f64` projection
/// ([`DecimalQuad::to_f64_lossy`]); deserializing never reconstructs a
/// `Number128` — an incoming number always lands on `Number64` or one of
/// the 128-bit integer variants.
#[cfg(feature = "serde")]
mod serde_support {
    use super::Value;
    use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Null => serializer.serialize_unit(),
                Value::Boolean(b) => serializer.serialize_bool(*b),
                Value::Number64(f) => serializer.serialize_f64(*f),
                Value::Integer128(i) => serializer.serialize_i128(*i),
                Value::Unsigned128(u) => serializer.serialize_u128(*u),
                Value::Number128(q) => serializer.serialize_f64(q.to_f64_lossy()),
                Value::String(s) => serializer.serialize_str(s),
                Value::Array(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                Value::Object(fields) => {
                    let mut map = serializer.serialize_map(Some(fields.len()))?;
                    for (k, v) in fields {
                        map.serialize_entry(k, v)?;
                    }
                    map.end()
                }
            }
        }
    }

    struct ValueVisitor;

    impl<'de> Visitor<'de> for ValueVisitor {
        type Value = Value;

        fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("a JSON value")
        }

        fn visit_unit<E>(self) -> Result<Value, E> {
            Ok(Value::Null)
        }

        fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
            Ok(Value::Boolean(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
            Ok(Value::Number64(v as f64))
        }

        fn visit_i128<E>(self, v: i128) -> Result<Value, E> {
            Ok(Value::Integer128(v))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
            Ok(Value::Number64(v as f64))
        }

        fn visit_u128<E>(self, v: u128) -> Result<Value, E> {
            Ok(Value::Unsigned128(v))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
            Ok(Value::Number64(v))
        }

        fn visit_str<E>(self, v: &str) -> Result<Value, E> {
            Ok(Value::String(v.to_owned()))
        }

        fn visit_string<E>(self, v: alloc::string::String) -> Result<Value, E> {
            Ok(Value::String(v))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element()? {
                items.push(item);
            }
            Ok(Value::Array(items))
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
            let mut fields = IndexMap::new();
            while let Some((k, v)) = map.next_entry::<alloc::string::String, Value>()? {
                fields.insert(k, v); // last-write-wins, matching parse semantics
            }
            Ok(Value::Object(fields))
        }
    }

    impl<'de> Deserialize<'de> for Value {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
            deserializer.deserialize_any(ValueVisitor)
        }
    }
}
