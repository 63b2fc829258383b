// In: src/program/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Program Layer
// ====================================================================================
//
// `Program` is the sole public evaluation surface of the library. It owns one
// native engine handle, compiled exactly once at construction, and drives the
// engine's pull protocol for every evaluation afterwards.
//
// Evaluation flow, per call:
//
//   1. [Parse]      input text -> one native JSON document (no lock held)
//   2. [Lock]       serialize access to the stateful handle
//   3. [Pull loop]  start(document), then next() until a terminal signal
//   4. [Reset]      start(null) to release the pending-input slot
//   5. [Unlock]     guard drop, on every path
//   6. [Classify]   finished / halted / halt-error / exception -> Result
//
// The halt classification in step 6 is a documented convention, not a native
// guarantee: the engine raises the same low-level flag for `halt` and
// `halt_error`, so the two are reconstructed from the exit code and message.
// Keep the rule exactly as written; callers depend on it.
//
// ====================================================================================

use std::ffi::CString;
use std::path::PathBuf;
use std::sync::Mutex;

use log::{debug, trace};

use crate::callbacks::{collect_error_message, forward_debug_message, DebugSink, ErrorCollector};
use crate::config::OutputConfig;
use crate::engine::jv::{Jv, Kind};
use crate::engine::Engine;
use crate::error::{ErrorMessage, EvalError, InitError};
use crate::format::{render, OutputFormat};

/// Default exit code the engine documents for an error halt that did not
/// supply a numeric code of its own.
const DEFAULT_HALT_ERROR_CODE: i32 = 5;

/// Terminal condition of one pull loop.
enum Termination {
    /// The stream ended normally with no further diagnostic.
    Finished,
    /// The filter halted without error; whatever was emitted stands.
    Halted,
    /// The filter halted with an error payload and/or nonzero code.
    HaltError {
        message: Option<ErrorMessage>,
        exit_code: i32,
    },
    /// The terminal value carried an attached diagnostic.
    Exception(ErrorMessage),
}

/// Mutex-guarded interior of a [`Program`].
struct EngineState {
    // Field order is load-bearing: `engine` must drop (tearing down the
    // native handle) before `debug`, because the handle holds an unretained
    // pointer to the sink.
    engine: Engine,
    #[allow(dead_code)] // held for its address; only the engine calls into it
    debug: Box<DebugSink>,
}

// SAFETY: the raw handle inside `engine` is confined to this struct, which is
// only ever reached through the owning Program's Mutex, so at most one thread
// touches it at a time. The engine has no thread affinity, only a
// no-concurrent-use requirement.
unsafe impl Send for EngineState {}

/// A compiled filter, evaluated many times against single JSON documents.
///
/// Construction compiles the filter once, synchronously; each of
/// [`first`](Program::first) / [`one`](Program::one) / [`all`](Program::all)
/// then runs the compiled program against one input. A `Program` is
/// `Send + Sync`; concurrent evaluations from several threads serialize on an
/// internal lock rather than failing. For parallel throughput, compile one
/// `Program` per consumer; compilation is the expensive step, evaluation is
/// cheap.
///
/// Evaluations never suspend and cannot be cancelled; a filter that wants an
/// abort mechanism must `halt` on its own.
///
/// # Single-document policy
///
/// The engine's "read more input documents" machinery is disabled: every
/// evaluation sees exactly one document. The input builtins therefore behave
/// as follows (and are covered by tests):
///
/// | Filter builtin | Behavior |
/// |---|---|
/// | `input` | error `"break"`, catchable only with `try`/`catch` |
/// | `inputs` | empty stream, no error |
/// | `input_filename` | `null` |
/// | `input_line_number` | error `"Unknown input line number"` |
/// | `debug` | payload forwarded to the process log (`jqbind::debug` target) |
pub struct Program {
    source: String,
    state: Mutex<EngineState>,
}

impl Program {
    /// Compiles `source` into a reusable program.
    ///
    /// `lib_paths` are the directories searched by `include`/`import`, in
    /// order; pass `&[]` when the filter uses no modules. Paths are handed to
    /// the engine as their display strings; they are not required to exist
    /// at compile time.
    ///
    /// On compile failure the native handle is torn down before this returns;
    /// there is no partial program to leak.
    pub fn new(source: &str, lib_paths: &[PathBuf]) -> Result<Self, InitError> {
        // A NUL byte cannot cross the C boundary; report it the way any other
        // unacceptable filter source is reported.
        let c_source = match CString::new(source) {
            Ok(c_source) => c_source,
            Err(_) => {
                return Err(InitError::CompileFailed {
                    messages: vec!["filter source contains a NUL byte".to_string()],
                })
            }
        };

        // 1. Allocate the native handle. Allocation is the only raw failure.
        let mut engine = Engine::new().ok_or(InitError::AllocationFailed)?;

        // 2. Collect compile diagnostics through a call-scoped adapter.
        let mut collector = ErrorCollector::new();
        engine.set_error_cb(Some(collect_error_message), collector.context_ptr());

        // 3. Module search paths. Always set, even when empty: the engine
        //    asserts on `include` if the attribute was never written.
        engine.set_lib_paths(lib_paths);

        // 4. Compile.
        let compiled = engine.compile(&c_source);

        // 5. Detach the collector before it leaves this frame. After a
        //    successful compile no diagnostics are expected, but the engine
        //    would otherwise keep a pointer into a dead stack frame.
        engine.reset_error_cb();

        if !compiled {
            let messages = collector.into_messages();
            debug!(
                "filter failed to compile with {} diagnostic(s)",
                messages.len()
            );
            // Dropping `engine` tears the handle down, exactly once.
            return Err(InitError::CompileFailed { messages });
        }

        // 6. Install the program-lifetime debug sink and pin the
        //    single-document policy.
        let mut debug_sink = Box::new(DebugSink::new());
        engine.set_debug_cb(Some(forward_debug_message), debug_sink.context_ptr());
        engine.disable_input_cb();

        trace!("compiled filter ({} bytes)", source.len());
        Ok(Program {
            source: source.to_string(),
            state: Mutex::new(EngineState {
                engine,
                debug: debug_sink,
            }),
        })
    }

    /// The original filter source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates `input` and returns the first emitted value, or `None` when
    /// the filter emits nothing. The empty outcome is a valid result, not an
    /// error.
    pub fn first<F: OutputFormat>(
        &self,
        input: &str,
        format: &F,
    ) -> Result<Option<F::Output>, EvalError> {
        let outputs = self.evaluate(input, format.config(), false)?;
        match outputs.into_iter().next() {
            Some(text) => Ok(Some(format.convert(text)?)),
            None => Ok(None),
        }
    }

    /// Evaluates `input` and returns the first emitted value, failing with
    /// [`EvalError::NoOutput`] when the filter emits nothing. For filters
    /// whose contract guarantees at least one result.
    pub fn one<F: OutputFormat>(&self, input: &str, format: &F) -> Result<F::Output, EvalError> {
        self.first(input, format)?.ok_or(EvalError::NoOutput)
    }

    /// Evaluates `input` and returns every emitted value, in emission order.
    /// Zero emissions yield an empty vec, not an error.
    pub fn all<F: OutputFormat>(
        &self,
        input: &str,
        format: &F,
    ) -> Result<Vec<F::Output>, EvalError> {
        self.evaluate(input, format.config(), true)?
            .into_iter()
            .map(|text| Ok(format.convert(text)?))
            .collect()
    }

    /// Shared evaluation driver. Returns emitted values rendered to text; the
    /// cardinality operations convert them after the lock is gone.
    fn evaluate(
        &self,
        input: &str,
        config: &OutputConfig,
        want_all: bool,
    ) -> Result<Vec<String>, EvalError> {
        // 1. Parse before locking, so malformed input costs no contention.
        let document = Jv::parse(input).map_err(EvalError::Parse)?;

        // 2. One in-flight evaluation per program; later callers block here.
        //    A poisoned lock is recovered rather than propagated: the reset
        //    in step 4 runs on every non-panicking path, and the next start()
        //    replaces whatever a panicked call left pending.
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // 3. Drive the pull loop.
        let (outputs, termination) = state.pump(document, config, want_all);

        // 4. Mandatory cleanup: release the retained pending-input slot
        //    before anyone else can take the lock.
        state.engine.start(Jv::null(), 0);

        // 5. Unlock. (Explicit so no later step can accidentally extend the
        //    critical section.)
        drop(state);

        // 6. Classify the terminal condition.
        match termination {
            Termination::Finished | Termination::Halted => Ok(outputs),
            Termination::Exception(message) => Err(EvalError::Exception(message)),
            Termination::HaltError { message, exit_code } => Err(EvalError::Halt {
                message,
                exit_code,
                partial: outputs,
            }),
        }
    }
}

impl EngineState {
    /// Feeds one document and pulls until a terminal signal. For
    /// `want_all == false` the loop stops at the first emitted value.
    fn pump(&mut self, document: Jv, config: &OutputConfig, want_all: bool) -> (Vec<String>, Termination) {
        self.engine.start(document, 0);

        let mut outputs = Vec::new();
        let termination = loop {
            let value = self.engine.next();

            if value.is_valid() {
                outputs.push(render(value, config));
                if want_all {
                    continue;
                }
                break Termination::Finished;
            }

            // Terminal. The halt flag outranks the value's own diagnostic:
            // an error halt surfaces both, and must classify as a halt.
            if self.engine.halted() {
                break self.classify_halt();
            }
            break match value.take_invalid_message() {
                Some(diagnostic) => Termination::Exception(capture_message(diagnostic)),
                None => Termination::Finished,
            };
        };

        trace!("evaluation terminated with {} output(s)", outputs.len());
        (outputs, termination)
    }

    /// Reconstructs halt-vs-error-halt from the exit code and message.
    ///
    /// The rule (a documented compatibility contract): an unreadable exit
    /// code is a plain halt; a readable non-numeric code becomes 5; a null or
    /// absent message counts as no message; and only "no message AND code 0"
    /// is a plain halt; every other combination is an error halt.
    fn classify_halt(&self) -> Termination {
        let code = self.engine.exit_code();
        if !code.is_valid() {
            return Termination::Halted;
        }
        let exit_code = if code.kind() == Kind::Number {
            code.number() as i32
        } else {
            DEFAULT_HALT_ERROR_CODE
        };

        let raw_message = self.engine.error_message();
        let message = match raw_message.kind() {
            Kind::Invalid | Kind::Null => None,
            _ => Some(capture_message(raw_message)),
        };

        if message.is_none() && exit_code == 0 {
            Termination::Halted
        } else {
            Termination::HaltError { message, exit_code }
        }
    }
}

/// Captures an engine-raised payload, recording whether it was a native
/// string (rendered raw) or an arbitrary value (rendered as JSON text).
fn capture_message(value: Jv) -> ErrorMessage {
    match value.kind() {
        Kind::String => ErrorMessage {
            text: value.string_contents(),
            is_string: true,
        },
        _ => ErrorMessage {
            text: value.dump(0),
            is_string: false,
        },
    }
}
