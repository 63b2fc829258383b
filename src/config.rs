// In: src/config.rs

//! Print configuration for emitted values.
//!
//! [`OutputConfig`] is pure data: four independent options created at the
//! call site and carried by a formatter. The engine consumes them as a single
//! bit-flag word, so the encoding in [`OutputConfig::dump_flags`] has to
//! match the native print flags bit for bit or pretty output renders wrong.

use std::os::raw::c_int;

use serde::{Deserialize, Serialize};

//==================================================================================
// I. Native print-flag word
//==================================================================================

// Native `jv_print_flags` values. PRETTY and SORTED and TAB are single bits;
// an N-space indent occupies a three-bit field starting at bit 8.
const DUMP_PRETTY: c_int = 1;
const DUMP_SORTED: c_int = 8;
const DUMP_TAB: c_int = 64;
const DUMP_INDENT_SHIFT: c_int = 8;

/// Largest space count the three-bit indent field can carry.
pub const MAX_INDENT_SPACES: u8 = 7;

//==================================================================================
// II. Configuration values
//==================================================================================

/// Indentation style for pretty-printed output.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Indent {
    /// Indent by a fixed space count. Values above
    /// [`MAX_INDENT_SPACES`] are clamped when encoded.
    Spaces(u8),
    /// Indent by tab characters.
    Tab,
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(2)
    }
}

/// How emitted values are rendered to text.
///
/// The default is the engine's compact form: unsorted keys, quoted strings,
/// no pretty-printing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// Sort object keys lexicographically instead of preserving insertion
    /// order.
    #[serde(default)]
    pub sort_keys: bool,

    /// When an emitted value is exactly a string, emit its contents unquoted
    /// instead of as a JSON string literal. Non-string values are unaffected.
    #[serde(default)]
    pub raw_strings: bool,

    /// Pretty-print with newlines and indentation.
    #[serde(default)]
    pub pretty: bool,

    /// Indentation style used when `pretty` is set.
    #[serde(default)]
    pub indent: Indent,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the config with key sorting enabled.
    pub fn sorted(mut self) -> Self {
        self.sort_keys = true;
        self
    }

    /// Returns the config with unquoted string output enabled.
    pub fn raw_strings(mut self) -> Self {
        self.raw_strings = true;
        self
    }

    /// Returns the config with pretty-printing enabled.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Returns the config with the given indentation style.
    pub fn indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    /// Encodes the configuration into the engine's print-flag word.
    pub(crate) fn dump_flags(&self) -> c_int {
        let mut flags = 0;
        if self.sort_keys {
            flags |= DUMP_SORTED;
        }
        if self.pretty {
            flags |= DUMP_PRETTY;
        }
        flags |= match self.indent {
            Indent::Tab => DUMP_TAB,
            Indent::Spaces(count) => {
                c_int::from(count.min(MAX_INDENT_SPACES)) << DUMP_INDENT_SHIFT
            }
        };
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_compact() {
        let config = OutputConfig::default();
        assert!(!config.sort_keys);
        assert!(!config.raw_strings);
        assert!(!config.pretty);
        assert_eq!(config.indent, Indent::Spaces(2));
        // Default two-space indent occupies the indent field even when
        // pretty is off; the engine ignores it without the pretty bit.
        assert_eq!(config.dump_flags(), 2 << 8);
    }

    #[test]
    fn flag_bits_match_the_native_word() {
        assert_eq!(OutputConfig::new().sorted().dump_flags() & 8, 8);
        assert_eq!(OutputConfig::new().pretty().dump_flags() & 1, 1);
        assert_eq!(
            OutputConfig::new().indent(Indent::Tab).dump_flags() & 64,
            64
        );
        assert_eq!(
            OutputConfig::new().indent(Indent::Spaces(4)).dump_flags() >> 8,
            4
        );
    }

    #[test]
    fn indent_spaces_clamp_to_field_width() {
        let config = OutputConfig::new().indent(Indent::Spaces(200));
        assert_eq!(config.dump_flags() >> 8, i32::from(MAX_INDENT_SPACES));
    }

    #[test]
    fn options_combine() {
        let config = OutputConfig::new().sorted().pretty().indent(Indent::Spaces(3));
        assert_eq!(config.dump_flags(), 1 | 8 | (3 << 8));
    }
}
