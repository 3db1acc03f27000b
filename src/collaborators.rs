//! External collaborator traits.
//!
//! The core depends only on these capabilities, never on a writer's,
//! logger's or clock's concrete identity - mirroring the way the corpus this
//! crate grew out of keeps its DNS resolution strategies behind narrow
//! traits rather than hard-wiring a transport.

use std::time::{Duration, Instant, SystemTime};

use crate::span::SpanData;

/// Accepts completed trace batches and flushes on demand. Implementations
/// must make `write` non-blocking; the buffer calls it while holding its
/// internal mutex.
pub trait Writer: Send + Sync {
    fn write(&self, batch: Vec<SpanData>);
    /// Blocks up to `timeout` for previously enqueued batches to drain.
    /// Returns whether the flush completed within the deadline.
    fn flush(&self, timeout: Duration) -> bool;
}

/// Diagnostic log levels for the `Logger` capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Receives diagnostic messages from the buffer. Side-effect-free from the
/// buffer's perspective: nothing in the core branches on whether logging
/// "succeeded".
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
    /// A message scoped to a specific trace, logged at trace granularity
    /// (e.g. "sampling priority reassignment ignored, trace is locked").
    fn trace(&self, trace_id: u64, message: &str);
}

/// A monotonic + wall-clock reading. Only `mono` is consulted by the
/// limiter; `wall` is provided so collaborators that need real timestamps
/// (e.g. a writer stamping ingestion time) don't need a second capability.
#[derive(Debug, Clone, Copy)]
pub struct TimePoint {
    pub wall: SystemTime,
    pub mono: Instant,
}

/// Supplies a `TimePoint` reading. Abstracted so tests can freeze time.
pub trait Clock: Send + Sync {
    fn now(&self) -> TimePoint;
}

/// The real clock, backed by `std::time`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimePoint {
        TimePoint {
            wall: SystemTime::now(),
            mono: Instant::now(),
        }
    }
}

/// A `Logger` that forwards to the `tracing` crate, for hosts that already
/// run a `tracing` subscriber and don't need a second diagnostics channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }

    fn trace(&self, trace_id: u64, message: &str) {
        tracing::trace!(trace_id, "{message}");
    }
}

/// Installs a process-wide `tracing` subscriber driven by `RUST_LOG` (falling
/// back to `default_level`), so the `#[instrument]`-annotated buffer
/// operations and `TracingLogger` actually have somewhere to go. Safe to call
/// more than once; a subscriber already installed by the host is left alone.
///
/// `json` selects `tracing_subscriber::fmt`'s JSON formatter over its default
/// pretty one, for hosts that ship structured logs to a collector.
pub fn init_tracing_subscriber(default_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let init_result = if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    if let Err(err) = init_result {
        // Another subscriber (the host's own, or one installed by an earlier
        // call) is already active; this is not an error for our purposes.
        tracing::debug!("tracing subscriber already initialized: {err}");
    }
}

/// A `Logger` that forwards `Warn`/`Error` messages to Sentry, for hosts that
/// already run a Sentry client and want the core's own diagnostics folded
/// into their crash-reporting pipeline. `Trace`/`Debug`/`Info` are dropped;
/// Sentry is a reporting channel, not a general log sink.
#[cfg(feature = "sentry-reporting")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SentryLogger;

#[cfg(feature = "sentry-reporting")]
impl Logger for SentryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let sentry_level = match level {
            LogLevel::Trace | LogLevel::Debug | LogLevel::Info => return,
            LogLevel::Warn => sentry::Level::Warning,
            LogLevel::Error => sentry::Level::Error,
        };
        sentry::configure_scope(|scope| {
            scope.set_tag("component", "trace_sampling_core");
        });
        sentry::capture_message(message, sentry_level);
    }

    fn trace(&self, trace_id: u64, message: &str) {
        sentry::configure_scope(|scope| {
            scope.set_tag("component", "trace_sampling_core");
            scope.set_extra("trace_id", trace_id.to_string().into());
        });
        sentry::capture_message(message, sentry::Level::Debug);
    }
}

/// A `Writer` that enqueues batches into an in-process channel. Useful as a
/// default when the host application wants to drain batches on its own
/// thread rather than implementing `Writer` itself.
pub struct ChannelWriter {
    sender: std::sync::mpsc::Sender<Vec<SpanData>>,
}

impl ChannelWriter {
    pub fn new() -> (Self, std::sync::mpsc::Receiver<Vec<SpanData>>) {
        let (sender, receiver) = std::sync::mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl Writer for ChannelWriter {
    fn write(&self, batch: Vec<SpanData>) {
        // A disconnected receiver means the host has shut the pipeline down;
        // there is nothing useful to do with the batch at that point.
        let _ = self.sender.send(batch);
    }

    fn flush(&self, _timeout: Duration) -> bool {
        // The channel itself has no notion of "drained"; hosts that need a
        // flush barrier should pair this with their own ack on the receiver
        // side. Nothing queued synchronously here can be lost.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let t0 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t1 = clock.now();
        assert!(t1.mono > t0.mono);
    }

    #[test]
    fn channel_writer_delivers_batch() {
        let (writer, receiver) = ChannelWriter::new();
        let span = SpanData::new(1, 1, 0, "svc", "op");
        writer.write(vec![span]);
        let batch = receiver.recv().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].trace_id, 1);
    }

    #[test]
    fn init_tracing_subscriber_does_not_panic_when_called_twice() {
        init_tracing_subscriber("info", false);
        // The second call must hit the "already initialized" branch rather
        // than panicking or replacing the host's subscriber.
        init_tracing_subscriber("info", true);
    }

    #[cfg(feature = "sentry-reporting")]
    #[test]
    fn sentry_logger_ignores_non_reporting_levels_without_a_client() {
        // No sentry::init() guard is active in this test process, so these
        // calls are no-ops; this only asserts they don't panic.
        let logger = SentryLogger;
        logger.log(LogLevel::Trace, "should be dropped, not reported");
        logger.log(LogLevel::Debug, "should be dropped, not reported");
        logger.log(LogLevel::Info, "should be dropped, not reported");
    }
}
