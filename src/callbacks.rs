// In: src/callbacks.rs

//! Message-callback adapters for the native engine's diagnostic hooks.
//!
//! The engine reports compiler diagnostics and `debug` emissions through C
//! callbacks of shape `(void *context, jv message) -> void`. Each adapter
//! here pairs an opaque context pointer (the adapter itself, unowned) with an
//! `extern "C"` trampoline that recovers the adapter and dispatches to its
//! instance method. The engine keeps the context pointer across calls, so
//! recovery must never take ownership; and the trampolines run underneath
//! native frames, so they must never unwind.
//!
//! Ownership of the message itself is the opposite story: the engine hands
//! the callback its own reference, so each trampoline wraps the raw value in
//! [`Jv`] immediately and lets it free exactly once.

use std::os::raw::c_void;

use crate::engine::jv::{Jv, Kind};

// =========================================================================
// === Compile-time diagnostics
// =========================================================================

/// Accumulates compiler diagnostics, in arrival order.
///
/// Scoped strictly to one construction call: the engine is reset to its
/// default error handler immediately after compilation, before the collector
/// leaves scope, so the handle never outlives the pointer it was given.
#[derive(Default)]
pub(crate) struct ErrorCollector {
    messages: Vec<String>,
}

impl ErrorCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Non-owning context pointer for the native callback registration.
    pub(crate) fn context_ptr(&mut self) -> *mut c_void {
        self as *mut Self as *mut c_void
    }

    pub(crate) fn into_messages(self) -> Vec<String> {
        self.messages
    }

    fn on_message(&mut self, message: Jv) {
        // String diagnostics are kept verbatim; anything else downgrades to
        // best-effort serialized text.
        let text = match message.kind() {
            Kind::String => message.string_contents(),
            _ => message.dump(0),
        };
        self.messages.push(text);
    }
}

/// Trampoline registered as the engine's error callback during compilation.
///
/// `data` is the pointer produced by [`ErrorCollector::context_ptr`] and must
/// still be live. Owns `message` either way.
pub(crate) unsafe extern "C" fn collect_error_message(data: *mut c_void, message: jq_sys::jv) {
    let message = Jv::from_raw(message);
    if data.is_null() {
        return;
    }
    let collector = &mut *(data as *mut ErrorCollector);
    collector.on_message(message);
}

// =========================================================================
// === debug-builtin forwarding
// =========================================================================

/// Forwards `debug` emissions to the process log.
///
/// Installed for the whole life of a [`Program`](crate::Program); the engine
/// stores the context pointer unretained, so the sink is boxed by its owner
/// and dropped only after the handle is torn down.
pub(crate) struct DebugSink;

impl DebugSink {
    pub(crate) fn new() -> Self {
        DebugSink
    }

    /// Non-owning context pointer for the native callback registration.
    pub(crate) fn context_ptr(&mut self) -> *mut c_void {
        self as *mut Self as *mut c_void
    }

    fn on_message(&mut self, payload: Jv) {
        log::debug!(target: "jqbind::debug", "{}", render_debug_payload(payload));
    }
}

/// Serializes a debug payload (the engine delivers `["DEBUG:", value]`) to
/// compact JSON text.
fn render_debug_payload(payload: Jv) -> String {
    payload.dump(0)
}

/// Trampoline registered as the engine's debug callback.
///
/// `data` is the pointer produced by [`DebugSink::context_ptr`]. Owns
/// `message` either way.
pub(crate) unsafe extern "C" fn forward_debug_message(data: *mut c_void, message: jq_sys::jv) {
    let message = Jv::from_raw(message);
    if data.is_null() {
        return;
    }
    let sink = &mut *(data as *mut DebugSink);
    sink.on_message(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_keeps_string_diagnostics_verbatim() {
        let mut collector = ErrorCollector::new();
        collector.on_message(Jv::parse(r#""jq: error: something broke""#).unwrap());
        collector.on_message(Jv::parse(r#""second message""#).unwrap());
        assert_eq!(
            collector.into_messages(),
            vec!["jq: error: something broke", "second message"]
        );
    }

    #[test]
    fn collector_serializes_non_string_diagnostics() {
        let mut collector = ErrorCollector::new();
        collector.on_message(Jv::parse(r#"{"odd": true}"#).unwrap());
        assert_eq!(collector.into_messages(), vec![r#"{"odd":true}"#]);
    }

    #[test]
    fn trampoline_recovers_collector_through_context_pointer() {
        let mut collector = ErrorCollector::new();
        let data = collector.context_ptr();
        let message = Jv::parse(r#""via trampoline""#).unwrap();
        unsafe { collect_error_message(data, message.into_raw()) };
        assert_eq!(collector.into_messages(), vec!["via trampoline"]);
    }

    #[test]
    fn debug_payload_renders_compact() {
        let payload = Jv::parse(r#"["DEBUG:", {"n": 1}]"#).unwrap();
        assert_eq!(render_debug_payload(payload), r#"["DEBUG:",{"n":1}]"#);
    }

    #[test]
    fn null_context_still_frees_the_message() {
        let message = Jv::parse("[1,2,3]").unwrap();
        unsafe { collect_error_message(std::ptr::null_mut(), message.into_raw()) };
    }
}
