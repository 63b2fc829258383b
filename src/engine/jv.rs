//! Owned wrapper over the engine's by-value `jv` handles.
//!
//! libjq's value API is reference counted with an ownership convention that
//! lives entirely in documentation: most `jv_*` calls consume the value they
//! are given, while the inspection calls (`jv_get_kind`, `jv_string_value`,
//! `jv_number_value`) only borrow it. [`Jv`] moves that convention into the
//! type system: consuming natives take `self`, inspections take `&self`,
//! and `Drop` releases the reference exactly once.

use std::os::raw::{c_char, c_int};

use jq_sys::{
    jv, jv_array, jv_array_append, jv_copy, jv_dump_string, jv_free, jv_get_kind,
    jv_invalid_get_msg, jv_invalid_has_msg, jv_kind_JV_KIND_INVALID, jv_kind_JV_KIND_NULL,
    jv_kind_JV_KIND_NUMBER, jv_kind_JV_KIND_STRING, jv_null, jv_number_value, jv_parse_sized,
    jv_string_length_bytes, jv_string_sized, jv_string_value,
};

/// Coarse value classification, covering only the kinds the wrapper ever
/// branches on. Everything that is not invalid/null/number/string collapses
/// into `Other` and is handled by serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Invalid,
    Null,
    Number,
    String,
    Other,
}

/// An owned native value. Freeing happens exactly once, on drop or when the
/// value is consumed by a native call through [`Jv::into_raw`].
pub(crate) struct Jv {
    raw: jv,
}

impl Jv {
    /// Takes ownership of a raw value. The caller must hold a reference that
    /// is theirs to release.
    pub(crate) fn from_raw(raw: jv) -> Self {
        Jv { raw }
    }

    /// Releases ownership to a consuming native call without touching the
    /// reference count.
    pub(crate) fn into_raw(self) -> jv {
        let raw = self.raw;
        std::mem::forget(self);
        raw
    }

    pub(crate) fn null() -> Self {
        Jv::from_raw(unsafe { jv_null() })
    }

    /// Builds a native string from arbitrary bytes (interior NULs included).
    pub(crate) fn text(s: &str) -> Self {
        Jv::from_raw(unsafe { jv_string_sized(s.as_ptr() as *const c_char, s.len() as c_int) })
    }

    /// Builds a native array of strings.
    pub(crate) fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut array = unsafe { jv_array() };
        for item in items {
            let element = Jv::text(item.as_ref());
            array = unsafe { jv_array_append(array, element.into_raw()) };
        }
        Jv::from_raw(array)
    }

    /// Parses `text` as exactly one JSON document. Trailing garbage and
    /// multiple top-level values are rejected by the native parser.
    pub(crate) fn parse(text: &str) -> Result<Self, String> {
        let raw = unsafe { jv_parse_sized(text.as_ptr() as *const c_char, text.len() as c_int) };
        let value = Jv::from_raw(raw);
        if value.is_valid() {
            Ok(value)
        } else {
            let reason = match value.take_invalid_message() {
                Some(message) if message.kind() == Kind::String => message.string_contents(),
                Some(message) => message.dump(0),
                None => "malformed JSON".to_string(),
            };
            Err(reason)
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        let kind = unsafe { jv_get_kind(self.raw) };
        if kind == jv_kind_JV_KIND_INVALID {
            Kind::Invalid
        } else if kind == jv_kind_JV_KIND_NULL {
            Kind::Null
        } else if kind == jv_kind_JV_KIND_NUMBER {
            Kind::Number
        } else if kind == jv_kind_JV_KIND_STRING {
            Kind::String
        } else {
            Kind::Other
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.kind() != Kind::Invalid
    }

    /// Numeric contents. Only meaningful for `Kind::Number`.
    pub(crate) fn number(&self) -> f64 {
        unsafe { jv_number_value(self.raw) }
    }

    /// String contents, copied out of the native buffer. Only meaningful for
    /// `Kind::String`. Non-UTF-8 bytes are replaced rather than rejected.
    pub(crate) fn string_contents(&self) -> String {
        unsafe {
            // jv_string_length_bytes consumes its argument, so feed it a copy.
            let len = jv_string_length_bytes(jv_copy(self.raw));
            if len <= 0 {
                return String::new();
            }
            let ptr = jv_string_value(self.raw) as *const u8;
            let bytes = std::slice::from_raw_parts(ptr, len as usize);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// Serializes the value to JSON text with the engine's print-flag word,
    /// consuming it.
    pub(crate) fn dump(self, flags: c_int) -> String {
        let dumped = Jv::from_raw(unsafe { jv_dump_string(self.into_raw(), flags) });
        dumped.string_contents()
    }

    /// Whether this invalid value carries an attached diagnostic. An invalid
    /// value without one is the engine's ordinary end-of-stream signal.
    pub(crate) fn invalid_has_message(&self) -> bool {
        // jv_invalid_has_msg consumes its argument, so feed it a copy.
        unsafe { jv_invalid_has_msg(jv_copy(self.raw)) != 0 }
    }

    /// Extracts the diagnostic from an invalid value, consuming it.
    pub(crate) fn take_invalid_message(self) -> Option<Self> {
        if !self.invalid_has_message() {
            return None;
        }
        Some(Jv::from_raw(unsafe { jv_invalid_get_msg(self.into_raw()) }))
    }
}

impl Drop for Jv {
    fn drop(&mut self) {
        unsafe { jv_free(self.raw) };
    }
}
