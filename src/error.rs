// In: src/error.rs

//! This module defines the error types for the jqbind library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Unlike a single catch-all enum, failures here are split by scope:
//! construction failures (`InitError`) are fatal and never leave a usable
//! [`Program`](crate::Program) behind, evaluation failures (`EvalError`) are
//! scoped to one call and leave the program fully reusable, and formatting
//! failures (`FormatError`) belong to the output-conversion stage, not the
//! engine.

use thiserror::Error;

// =========================================================================
// === Construction Errors
// =========================================================================

/// A failure while building a [`Program`](crate::Program).
#[derive(Error, Debug)]
pub enum InitError {
    /// The native engine could not allocate its state. This is the only way
    /// raw allocation can fail; everything after it reports through the
    /// compile path.
    #[error("failed to allocate native jq state")]
    AllocationFailed,

    /// The filter source did not compile. Carries every diagnostic the engine
    /// reported, in the order it reported them. The list can be empty: the
    /// engine does not guarantee a message for every rejection.
    #[error("filter failed to compile ({} diagnostic(s))", .messages.len())]
    CompileFailed {
        /// Ordered compiler diagnostics, human-readable.
        messages: Vec<String>,
    },
}

// =========================================================================
// === Evaluation Errors
// =========================================================================

/// A failure during one `first`/`one`/`all` call.
///
/// Every variant is scoped to the call that produced it; the owning
/// [`Program`](crate::Program) remains valid and reusable afterwards.
#[derive(Error, Debug)]
pub enum EvalError {
    /// The input text was not a single well-formed JSON document. Raised
    /// before the evaluation lock is taken, so a malformed input never costs
    /// lock contention.
    #[error("invalid JSON input: {0}")]
    Parse(String),

    /// The filter raised an error that nothing caught (e.g. `error("boom")`).
    #[error("filter raised an uncaught error: {0}")]
    Exception(ErrorMessage),

    /// The filter stopped itself via `halt_error` (or `halt_error(code)` with
    /// a message or a nonzero code). A plain `halt`, and `null | halt_error(0)`,
    /// are *not* errors: they end the stream successfully with whatever was
    /// emitted so far.
    #[error("filter halted with exit code {exit_code}")]
    Halt {
        /// The halt payload, if the filter supplied one.
        message: Option<ErrorMessage>,
        /// Exit code reported by the engine; 5 when the filter supplied a
        /// non-numeric code, per the engine's own default for error halts.
        exit_code: i32,
        /// Values emitted before the halt, rendered to text. Empty for
        /// `first`/`one`, which stop pulling at their first value.
        partial: Vec<String>,
    },

    /// `one` was called but the filter emitted nothing. `first` and `all`
    /// treat the empty outcome as a valid result instead.
    #[error("filter produced no output")]
    NoOutput,

    /// The output-conversion stage rejected an emitted value. Distinct from
    /// the engine-level failures above: the evaluation itself succeeded.
    #[error(transparent)]
    Format(#[from] FormatError),
}

// =========================================================================
// === Formatting Errors
// =========================================================================

/// A failure while converting emitted text into the caller's requested shape.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The emitted text did not decode into the requested type.
    #[error("failed to decode emitted value: {0}")]
    Decode(#[from] serde_json::Error),
}

// =========================================================================
// === Diagnostic Payloads
// =========================================================================

/// A diagnostic payload attached to an exception or an error halt.
///
/// The engine can raise with either a plain string or an arbitrary value.
/// `is_string` records which: string payloads hold their contents verbatim,
/// anything else is carried as its serialized JSON text. The two must render
/// differently downstream (a string is shown raw, a value re-parses as JSON).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Raw message text.
    pub text: String,
    /// True when the engine raised a string value; false when the payload was
    /// a non-string value and `text` is its JSON serialization.
    pub is_string: bool,
}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
