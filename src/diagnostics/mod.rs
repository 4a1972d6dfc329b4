//! Tag-based tracing for the engine. A [`Diagnostics`] context is owned by the host (usually held
//! by the solver); nothing here is global. Whether writes take a lock is fixed when the context is
//! created through its [`ThreadingMode`].
mod sink;
mod trace_tag;

use std::cell::RefCell;
use std::fmt::Arguments;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use enumset::EnumSet;
use sink::SinkWriter;
pub use sink::TraceSink;
pub use trace_tag::TraceTag;

/// How the trace output of a [`Diagnostics`] context is shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThreadingMode {
    /// A single writer; no locking takes place.
    #[default]
    SingleThreaded,
    /// The output stream sits behind a mutex and the context can be shared with other threads
    /// through [`Diagnostics::share`].
    Synchronised,
}

#[derive(Debug)]
enum Output {
    Local(RefCell<SinkWriter>),
    Shared(Arc<Mutex<SinkWriter>>),
}

#[derive(Debug)]
pub struct Diagnostics {
    enabled: EnumSet<TraceTag>,
    output: Output,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics::new(ThreadingMode::SingleThreaded, TraceSink::Discard)
    }
}

impl Diagnostics {
    /// Create a context with every tag disabled.
    pub fn new(mode: ThreadingMode, sink: TraceSink) -> Diagnostics {
        let writer = SinkWriter::new(sink);
        let output = match mode {
            ThreadingMode::SingleThreaded => Output::Local(RefCell::new(writer)),
            ThreadingMode::Synchronised => Output::Shared(Arc::new(Mutex::new(writer))),
        };

        Diagnostics {
            enabled: EnumSet::empty(),
            output,
        }
    }

    pub fn mode(&self) -> ThreadingMode {
        match self.output {
            Output::Local(_) => ThreadingMode::SingleThreaded,
            Output::Shared(_) => ThreadingMode::Synchronised,
        }
    }

    pub fn enable(&mut self, tag: TraceTag) {
        let _ = self.enabled.insert(tag);
    }

    pub fn disable(&mut self, tag: TraceTag) {
        let _ = self.enabled.remove(tag);
    }

    pub fn enable_all(&mut self) {
        self.enabled = EnumSet::all();
    }

    pub fn is_enabled(&self, tag: TraceTag) -> bool {
        self.enabled.contains(tag)
    }

    /// A second handle onto the same output stream, with its own tag set. Only available in
    /// [`ThreadingMode::Synchronised`].
    pub fn share(&self) -> Option<Diagnostics> {
        match &self.output {
            Output::Local(_) => None,
            Output::Shared(writer) => Some(Diagnostics {
                enabled: self.enabled,
                output: Output::Shared(Arc::clone(writer)),
            }),
        }
    }

    /// Write one line for `tag` if the tag is enabled.
    pub fn trace(&self, tag: TraceTag, message: Arguments<'_>) {
        if !self.is_enabled(tag) {
            return;
        }

        let line = format!("[{}] {message}", tag.name());
        self.with_writer(|writer| writer.write_line(&line));
    }

    /// Remove and return everything traced so far to a [`TraceSink::Buffer`].
    pub fn take_buffer(&self) -> String {
        self.with_writer(SinkWriter::take_buffer)
    }

    pub fn flush(&self) {
        self.with_writer(SinkWriter::flush)
    }

    fn with_writer<T>(&self, action: impl FnOnce(&mut SinkWriter) -> T) -> T {
        match &self.output {
            Output::Local(writer) => action(&mut *writer.borrow_mut()),
            Output::Shared(writer) => {
                let mut guard = writer.lock().unwrap_or_else(PoisonError::into_inner);
                action(&mut *guard)
            }
        }
    }
}

/// Trace through a [`Diagnostics`] context; the message is only formatted when the tag is on.
macro_rules! arith_trace {
    ($diagnostics:expr, $tag:expr, $($arg:tt)*) => {
        if $diagnostics.is_enabled($tag) {
            $diagnostics.trace($tag, format_args!($($arg)*));
        }
    };
}

pub(crate) use arith_trace;

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn only_enabled_tags_are_written() {
        let mut diagnostics = Diagnostics::new(ThreadingMode::SingleThreaded, TraceSink::Buffer);
        diagnostics.enable(TraceTag::Simplex);

        diagnostics.trace(TraceTag::Simplex, format_args!("pivot {}", 3));
        diagnostics.trace(TraceTag::Bounds, format_args!("hidden"));

        assert_eq!("[simplex] pivot 3\n", diagnostics.take_buffer());
    }

    #[test]
    fn disabling_a_tag_silences_it() {
        let mut diagnostics = Diagnostics::new(ThreadingMode::SingleThreaded, TraceSink::Buffer);
        diagnostics.enable_all();
        diagnostics.disable(TraceTag::Integer);

        assert!(diagnostics.is_enabled(TraceTag::Nonlinear));
        assert!(!diagnostics.is_enabled(TraceTag::Integer));
    }

    #[test]
    fn single_threaded_contexts_cannot_be_shared() {
        let diagnostics = Diagnostics::default();
        assert!(diagnostics.share().is_none());
        assert_eq!(ThreadingMode::SingleThreaded, diagnostics.mode());
    }

    #[test]
    fn synchronised_contexts_share_one_stream() {
        let mut diagnostics = Diagnostics::new(ThreadingMode::Synchronised, TraceSink::Buffer);
        diagnostics.enable(TraceTag::Backtrack);

        let handles = (0..4)
            .map(|index| {
                let shared = diagnostics.share().expect("synchronised context");
                thread::spawn(move || shared.trace(TraceTag::Backtrack, format_args!("{index}")))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("tracing thread does not panic");
        }

        assert_eq!(4, diagnostics.take_buffer().lines().count());
    }

    #[test]
    fn tags_round_trip_through_their_names() {
        for tag in EnumSet::<TraceTag>::all() {
            assert_eq!(Some(tag), TraceTag::from_name(tag.name()));
        }
        assert_eq!(None, TraceTag::from_name("verbose"));
    }
}
