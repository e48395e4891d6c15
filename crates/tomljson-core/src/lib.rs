//! # tomljson-core
//!
//! Streaming TOML-to-JSON transcoder: bytes of TOML go in, bytes of
//! equivalent JSON come out, in a single forward pass with no
//! intermediate value tree. Output can be drained while input is still
//! being fed, and every drained prefix is a valid prefix of the final
//! JSON document.
//!
//! ## Quick start
//!
//! ```rust
//! // whole documents
//! let json = tomljson_core::transcode("[server]\nport = 8080").unwrap();
//! assert_eq!(json, r#"{"server":{"port":8080}}"#);
//!
//! // streams
//! use std::io::Read;
//! let mut json = String::new();
//! tomljson_core::JsonReader::new("a = [1, 2]".as_bytes())
//!     .read_to_string(&mut json)
//!     .unwrap();
//! assert_eq!(json, r#"{"a":[1,2]}"#);
//! ```
//!
//! ## How it works
//!
//! - Runes are dispatched one at a time into a stack of parse scopes, one
//!   scope per grammatical context (`transcoder`, `scope`, `parser`,
//!   `strings`, `numbers`, `datetime`).
//! - TOML's redefinition rules are enforced by a trie of declared key
//!   paths plus a stack of open array-of-tables headers (`namespace`).
//! - JSON structure is produced forward-only by diffing each declared key
//!   path against the spine of the currently-open output object
//!   (`emitter`).
//!
//! ## Value mapping
//!
//! Integers (including `0x`/`0o`/`0b` after base conversion) and floats
//! become JSON numbers; booleans become `true`/`false`; dates and times
//! become JSON strings preserving their source text; `inf`/`nan` (with
//! optional sign) become JSON strings. 6-digit `\U` escapes have no JSON
//! equivalent and survive as literal `\\U` plus six hex digits.

mod buffer;
mod datetime;
mod emitter;
pub mod error;
mod namespace;
mod numbers;
mod parser;
mod reader;
mod rune;
mod scope;
mod strings;
mod transcoder;

pub use error::{ParseError, Result};
pub use reader::JsonReader;
pub use transcoder::{transcode, Transcoder};
