//! Logging setup.
//!
//! Bromine reports through `tracing`; nothing in the library depends on a
//! subscriber being installed. [`init`] installs a formatted subscriber for
//! test binaries, and [`LogCounter`] counts events so a suite can assert on
//! what was logged (e.g. "no resolution errors in this test").

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::result::{BromineError, BromineResult};

/// Minimum level of emitted log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings (resolution misses)
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Cascade steps
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    #[must_use]
    pub const fn as_filter(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Install a global formatted subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Fails if a global subscriber is
/// already set.
pub fn init(level: LogLevel) -> BromineResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| BromineError::Logging {
            message: e.to_string(),
        })
}

/// Install a global subscriber writing one JSON object per event.
///
/// Same filtering rules as [`init`].
pub fn init_json(level: LogLevel) -> BromineResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .map_err(|e| BromineError::Logging {
            message: e.to_string(),
        })
}

#[derive(Debug, Default)]
struct Counts {
    errors: AtomicUsize,
    warnings: AtomicUsize,
    total: AtomicUsize,
}

/// Layer counting log events by level.
///
/// Clones share their counts.
#[derive(Debug, Clone, Default)]
pub struct LogCounter {
    counts: Arc<Counts>,
}

impl LogCounter {
    /// Create a counter with all counts at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with this counter as the thread's default subscriber
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = Registry::default().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Number of `ERROR` events
    #[must_use]
    pub fn errors(&self) -> usize {
        self.counts.errors.load(Ordering::SeqCst)
    }

    /// Number of `WARN` events
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.counts.warnings.load(Ordering::SeqCst)
    }

    /// Number of events of any level
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.total.load(Ordering::SeqCst)
    }

    /// Reset all counts to zero
    pub fn reset(&self) {
        self.counts.errors.store(0, Ordering::SeqCst);
        self.counts.warnings.store(0, Ordering::SeqCst);
        self.counts.total.store(0, Ordering::SeqCst);
    }
}

impl<S: Subscriber> Layer<S> for LogCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level == Level::ERROR {
            self.counts.errors.fetch_add(1, Ordering::SeqCst);
        } else if level == Level::WARN {
            self.counts.warnings.fetch_add(1, Ordering::SeqCst);
        }
        self.counts.total.fetch_add(1, Ordering::SeqCst);
    }
}
