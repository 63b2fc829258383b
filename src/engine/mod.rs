// In: src/engine/mod.rs

//! Thin ownership layer over the native engine handle.
//!
//! [`Engine`] owns exactly one `jq_state` allocation for its whole life:
//! created by [`Engine::new`], destroyed exactly once by `Drop`. That single
//! pairing covers both the failed-construction path (a compile error tears
//! the handle down before the constructor returns) and ordinary end-of-life.
//! Everything stateful beyond create/destroy is a one-call passthrough; the
//! processing protocol built on top lives in [`crate::program`].

pub(crate) mod jv;

use std::os::raw::{c_int, c_void};
use std::path::PathBuf;
use std::ptr;

use jq_sys::{
    jq_compile, jq_get_error_message, jq_get_exit_code, jq_halted, jq_init, jq_msg_cb, jq_next,
    jq_set_attr, jq_set_debug_cb, jq_set_error_cb, jq_set_input_cb, jq_start, jq_state,
    jq_teardown,
};

use self::jv::Jv;

/// Owns one native `jq_state` handle.
pub(crate) struct Engine {
    raw: *mut jq_state,
}

impl Engine {
    /// Allocates a fresh handle. `None` means the native allocator failed,
    /// the only way this call can fail.
    pub(crate) fn new() -> Option<Self> {
        let raw = unsafe { jq_init() };
        if raw.is_null() {
            None
        } else {
            Some(Engine { raw })
        }
    }

    /// Compiles `source` against this handle. Diagnostics are delivered
    /// through whatever error callback is installed at the time.
    pub(crate) fn compile(&mut self, source: &std::ffi::CStr) -> bool {
        unsafe { jq_compile(self.raw, source.as_ptr()) != 0 }
    }

    /// Installs a compile/runtime error callback. `data` must stay valid for
    /// as long as the callback is installed.
    pub(crate) fn set_error_cb(&mut self, cb: jq_msg_cb, data: *mut c_void) {
        unsafe { jq_set_error_cb(self.raw, cb, data) };
    }

    /// Restores the engine's default error handler, dropping any pointer the
    /// handle held to a caller-owned collector.
    pub(crate) fn reset_error_cb(&mut self) {
        unsafe { jq_set_error_cb(self.raw, None, ptr::null_mut()) };
    }

    /// Installs a `debug`-builtin callback. `data` must stay valid for the
    /// rest of the handle's life; the engine stores it unretained.
    pub(crate) fn set_debug_cb(&mut self, cb: jq_msg_cb, data: *mut c_void) {
        unsafe { jq_set_debug_cb(self.raw, cb, data) };
    }

    /// Disables the "read next input document" callback. With no callback
    /// installed the engine's input builtins degrade to their documented
    /// single-document behaviors (see [`crate::Program`]).
    pub(crate) fn disable_input_cb(&mut self) {
        unsafe { jq_set_input_cb(self.raw, None, ptr::null_mut()) };
    }

    /// Sets the module search path list. The engine asserts on `include` /
    /// `import` if this attribute was never set, so it is always written,
    /// even when `paths` is empty.
    pub(crate) fn set_lib_paths(&mut self, paths: &[PathBuf]) {
        let attr = Jv::text("JQ_LIBRARY_PATH");
        let list = Jv::string_array(paths.iter().map(|path| path.to_string_lossy()));
        unsafe { jq_set_attr(self.raw, attr.into_raw(), list.into_raw()) };
    }

    /// Feeds the next input document, consuming it. Also used with a null
    /// document to release the handle's pending-input slot after a run.
    pub(crate) fn start(&mut self, input: Jv, flags: c_int) {
        unsafe { jq_start(self.raw, input.into_raw(), flags) };
    }

    /// Pulls the next emitted value.
    pub(crate) fn next(&mut self) -> Jv {
        Jv::from_raw(unsafe { jq_next(self.raw) })
    }

    /// Whether the program executed a `halt`/`halt_error`. The low-level
    /// signal is the same for both; classification happens upstream.
    pub(crate) fn halted(&self) -> bool {
        unsafe { jq_halted(self.raw) != 0 }
    }

    /// The exit code recorded by a halt, as a native value. Invalid when the
    /// halt carried no code at all.
    pub(crate) fn exit_code(&self) -> Jv {
        Jv::from_raw(unsafe { jq_get_exit_code(self.raw) })
    }

    /// The message recorded by a halt, as a native value. Null or invalid
    /// when the halt carried no message.
    pub(crate) fn error_message(&self) -> Jv {
        Jv::from_raw(unsafe { jq_get_error_message(self.raw) })
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // jq_teardown nulls the pointer, so a double drop cannot double-free.
        unsafe { jq_teardown(&mut self.raw) };
    }
}
