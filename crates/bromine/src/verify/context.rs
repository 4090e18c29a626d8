//! Shared verification state.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::result::{BromineError, BromineResult};

/// Notification sent to listeners for every failed verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyFailedEvent {
    /// Policy that observed the failure
    pub policy: String,
    /// Failure description
    pub message: String,
}

impl VerifyFailedEvent {
    /// Create an event
    #[must_use]
    pub fn new(policy: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            message: message.into(),
        }
    }
}

/// A recorded soft-verification failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyFailure {
    /// Position in the failure log (0-based)
    pub index: usize,
    /// Policy that recorded it
    pub policy: String,
    /// Failure description
    pub message: String,
    /// When it was recorded
    pub recorded_at: DateTime<Local>,
}

/// Lifecycle of the accumulated soft failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoftState {
    /// No soft failure recorded
    #[default]
    Clean,
    /// Soft failures recorded since the last aggregate
    Failed,
    /// Every recorded failure has been raised
    Reported,
}

/// Listener invoked with every [`VerifyFailedEvent`]
pub type VerifyListener = Arc<dyn Fn(&VerifyFailedEvent) + Send + Sync>;

#[derive(Default)]
struct ContextState {
    failures: Vec<VerifyFailure>,
    soft: SoftState,
    reported: usize,
    listeners: Vec<VerifyListener>,
}

/// Failure log, soft-failure flag and listeners of one session.
///
/// Clones share state, so every policy of a session sees the same log.
#[derive(Clone, Default)]
pub struct VerifyContext {
    state: Arc<Mutex<ContextState>>,
}

impl fmt::Debug for VerifyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("VerifyContext")
            .field("failures", &state.failures.len())
            .field("soft", &state.soft)
            .field("listeners", &state.listeners.len())
            .finish_non_exhaustive()
    }
}

impl VerifyContext {
    /// Create an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to failure notifications
    pub fn on_verify_failed<F>(&self, listener: F)
    where
        F: Fn(&VerifyFailedEvent) + Send + Sync + 'static,
    {
        self.lock().listeners.push(Arc::new(listener));
    }

    /// Notify every listener, in subscription order.
    ///
    /// Listeners run without the lock held so they may query the context.
    pub(crate) fn raise(&self, event: &VerifyFailedEvent) {
        let listeners = self.lock().listeners.clone();
        for listener in &listeners {
            listener(event);
        }
    }

    /// Append a soft failure and mark the context failed
    pub(crate) fn record(&self, policy: &str, message: &str) {
        let mut state = self.lock();
        let index = state.failures.len();
        state.failures.push(VerifyFailure {
            index,
            policy: policy.to_string(),
            message: message.to_string(),
            recorded_at: Local::now(),
        });
        state.soft = SoftState::Failed;
    }

    /// Snapshot of recorded failures, in order
    #[must_use]
    pub fn failures(&self) -> Vec<VerifyFailure> {
        self.lock().failures.clone()
    }

    /// Number of recorded failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.lock().failures.len()
    }

    /// True once any soft failure was recorded; never resets
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.lock().soft != SoftState::Clean
    }

    /// Current soft-failure state
    #[must_use]
    pub fn soft_state(&self) -> SoftState {
        self.lock().soft
    }

    /// True when failures exist that [`finish`](Self::finish) has not reported
    #[must_use]
    pub fn has_unreported(&self) -> bool {
        let state = self.lock();
        state.failures.len() > state.reported
    }

    /// Raise the aggregate soft failure.
    ///
    /// Returns an error covering every failure recorded since the previous
    /// call, or `Ok` when there are none. Each failure is raised once.
    pub fn finish(&self) -> BromineResult<()> {
        let mut state = self.lock();
        let total = state.failures.len();
        if total <= state.reported {
            return Ok(());
        }
        let failures: Vec<String> = state.failures[state.reported..]
            .iter()
            .map(|f| f.message.clone())
            .collect();
        state.reported = total;
        state.soft = SoftState::Reported;
        Err(BromineError::SoftVerifyFailed {
            count: failures.len(),
            failures,
        })
    }
}
