//! This file is the root of the `jqbind` Rust crate.
//!
//! jqbind is a thin safety and ergonomics layer over the native jq engine:
//! a filter is compiled once into a [`Program`], then evaluated against many
//! JSON inputs, each evaluation collecting zero, one, or many emitted values.
//! The crate's job is the lifecycle and concurrency discipline around the
//! stateful native handle: compile-once ownership, one evaluation in flight
//! per program, the multi-result pull loop, and a typed taxonomy over the
//! engine's ambiguous halt/exception/parse signals. The query language itself
//! belongs entirely to the engine.
//!
//! ```no_run
//! use jqbind::{Program, TextFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let filter = Program::new(".[] | select(.active) | .name", &[])?;
//! let names = filter.all(r#"[{"name":"a","active":true}]"#, &TextFormat::default())?;
//! assert_eq!(names, vec![r#""a""#]);
//! # Ok(())
//! # }
//! ```

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod error;
pub mod format;

mod callbacks;
mod engine;
mod program;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use config::{Indent, OutputConfig, MAX_INDENT_SPACES};
pub use error::{ErrorMessage, EvalError, FormatError, InitError};
pub use format::{BytesFormat, DecodeFormat, OutputFormat, TextFormat};
pub use program::Program;
