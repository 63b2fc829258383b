// In: src/format.rs

//! Output formatting strategies.
//!
//! A formatter bundles an [`OutputConfig`] with a pure conversion from the
//! engine's emitted text into the caller's shape. The closed built-in set:
//!
//! - [`TextFormat`]  is the rendered text, unchanged.
//! - [`BytesFormat`] is the rendered text as UTF-8 bytes.
//! - [`DecodeFormat`] is the rendered text decoded into a `serde` type.
//!
//! Conversions run after the evaluation lock is released, but the contract is
//! the same as if they ran inside it: a conversion must be a pure function of
//! its text and must not call back into the owning
//! [`Program`](crate::Program).

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::config::OutputConfig;
use crate::engine::jv::{Jv, Kind};
use crate::error::FormatError;

/// A conversion strategy from emitted text to a caller-chosen output shape.
pub trait OutputFormat {
    /// What one emitted value converts into.
    type Output;

    /// Print configuration applied when rendering emitted values to text.
    fn config(&self) -> &OutputConfig;

    /// Converts one rendered value. Must be pure; a failure surfaces to the
    /// caller as [`FormatError`], distinct from evaluation failures.
    fn convert(&self, text: String) -> Result<Self::Output, FormatError>;
}

/// Renders one emitted value to text per `config`.
///
/// The raw-string special case applies only when the value's kind is exactly
/// string: its contents are emitted unquoted. Everything else serializes as
/// JSON text honoring the config's flag word.
pub(crate) fn render(value: Jv, config: &OutputConfig) -> String {
    if config.raw_strings && value.kind() == Kind::String {
        value.string_contents()
    } else {
        value.dump(config.dump_flags())
    }
}

// =========================================================================
// === Built-in formatters
// =========================================================================

/// Identity formatter: emitted values as rendered text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat {
    pub config: OutputConfig,
}

impl TextFormat {
    pub fn new(config: OutputConfig) -> Self {
        TextFormat { config }
    }
}

impl OutputFormat for TextFormat {
    type Output = String;

    fn config(&self) -> &OutputConfig {
        &self.config
    }

    fn convert(&self, text: String) -> Result<String, FormatError> {
        Ok(text)
    }
}

/// Byte formatter: emitted values as UTF-8 encoded bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesFormat {
    pub config: OutputConfig,
}

impl BytesFormat {
    pub fn new(config: OutputConfig) -> Self {
        BytesFormat { config }
    }
}

impl OutputFormat for BytesFormat {
    type Output = Vec<u8>;

    fn config(&self) -> &OutputConfig {
        &self.config
    }

    fn convert(&self, text: String) -> Result<Vec<u8>, FormatError> {
        Ok(text.into_bytes())
    }
}

/// Decoding formatter: emitted values parsed as JSON into `T`.
///
/// Combining this with [`OutputConfig::raw_strings`] is almost always a
/// mistake: a raw string emission is not valid JSON text, so decoding fails.
#[derive(Debug, Clone, Copy)]
pub struct DecodeFormat<T> {
    pub config: OutputConfig,
    marker: PhantomData<fn() -> T>,
}

impl<T> DecodeFormat<T> {
    pub fn new(config: OutputConfig) -> Self {
        DecodeFormat {
            config,
            marker: PhantomData,
        }
    }
}

impl<T> Default for DecodeFormat<T> {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

impl<T: DeserializeOwned> OutputFormat for DecodeFormat<T> {
    type Output = T;

    fn config(&self) -> &OutputConfig {
        &self.config
    }

    fn convert(&self, text: String) -> Result<T, FormatError> {
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Indent;

    fn value(text: &str) -> Jv {
        Jv::parse(text).unwrap()
    }

    #[test]
    fn render_compact_by_default() {
        let config = OutputConfig::default();
        assert_eq!(render(value(r#"{"a": [1, 2]}"#), &config), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn render_raw_string_unquoted() {
        let config = OutputConfig::new().raw_strings();
        assert_eq!(render(value(r#""Alice""#), &config), "Alice");
        // Only exact string kinds are unquoted.
        assert_eq!(render(value("[\"Alice\"]"), &config), r#"["Alice"]"#);
    }

    #[test]
    fn render_quoted_string_without_raw() {
        let config = OutputConfig::default();
        assert_eq!(render(value(r#""Alice""#), &config), r#""Alice""#);
    }

    #[test]
    fn render_sorted_keys() {
        let config = OutputConfig::new().sorted();
        assert_eq!(render(value(r#"{"b":1,"a":2}"#), &config), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn render_pretty_two_spaces() {
        let config = OutputConfig::new().pretty();
        assert_eq!(render(value(r#"{"a":1}"#), &config), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn render_pretty_tab() {
        let config = OutputConfig::new().pretty().indent(Indent::Tab);
        assert_eq!(render(value(r#"{"a":1}"#), &config), "{\n\t\"a\": 1\n}");
    }

    #[test]
    fn decode_format_decodes_typed_values() {
        let format = DecodeFormat::<Vec<i64>>::default();
        assert_eq!(format.convert("[1,2,3]".to_string()).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn decode_format_failure_is_a_format_error() {
        let format = DecodeFormat::<String>::default();
        let err = format.convert("42".to_string()).unwrap_err();
        assert!(matches!(err, FormatError::Decode(_)));
    }

    #[test]
    fn bytes_format_is_utf8() {
        let format = BytesFormat::default();
        assert_eq!(format.convert("1".to_string()).unwrap(), b"1".to_vec());
    }
}
