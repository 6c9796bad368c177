//! # fastjson
//!
//! SIMD-accelerated JSON codec with a two-phase parser, adaptive numeric
//! decoding, a parallel driver for large top-level arrays, and a lazy
//! query pipeline over the resulting value tree.
//!
//! ## Module organization
//!
//! - [`cpu`] - runtime CPU-feature probe (C1)
//! - [`simd`] - lane-width-generic structural primitives (C2)
//! - [`text`] - UTF-8 validation and `\uXXXX` escape decoding (C3)
//! - [`number`] - adaptive 64-/128-bit/NaN numeric decoder (C4)
//! - [`value`] - the JSON value tree (C5)
//! - [`index`] - structural indexer, Phase 1 of the parser (C6)
//! - [`parser`] - sequential recursive-descent materializer, Phase 2 (C7)
//! - [`parallel`] - parallel driver for large top-level arrays (C8, `parallel` feature)
//! - [`serialize`] - value tree -> JSON bytes (C9)
//! - [`query`] - lazy filter/transform/fold pipeline (C10)
//! - [`error`] - parse error taxonomy
//! - [`config`] - [`ParseConfig`] and related knobs
//!
//! ## Quick start
//!
//! ```
//! use fastjson::{parse, Value};
//!
//! let v = parse(br#"{"a":[1,2,3]}"#).unwrap();
//! assert_eq!(v.get_key("a").len(), 3);
//! ```
//!
//! ## Features
//!
//! - `std` (default) - enables runtime CPU-feature detection; without it
//!   the probe runs fresh on every call instead of being cached.
//! - `parallel` (default) - pulls in `rayon` for the parallel parser (C8)
//!   and the parallel query driver (C10).
//! - `simd` - forces the accelerated intrinsics path even when the
//!   auto-detected build would otherwise pick scalar; useful for
//!   isolating the accelerated path in benchmarks.
//! - `serde` - `Serialize`/`Deserialize` for [`Value`].
//! - `cli` - builds the `fastjson` binary.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

pub mod config;
pub mod cpu;
pub mod error;
pub mod index;
pub mod number;
pub mod parser;
pub mod query;
pub mod serialize;
pub mod simd;
pub mod text;
pub mod value;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use config::{NumaBinding, ParseConfig};
pub use error::{ParseError, ParseErrorKind, Position};
pub use number::{DecimalQuad, DecodedNumber, NumberError};
pub use parser::{parse, parse_with};
pub use query::Chain;
pub use serialize::{serialize, serialize_pretty};
pub use value::{Value, ValueBuilder};
