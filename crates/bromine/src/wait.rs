//! Polling waits.
//!
//! Waits sit above resolution: each poll runs an ordinary lookup, so a
//! locator that does not resolve yet is simply polled again. Collaborator
//! faults end the wait immediately.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::SessionConfig;
use crate::element::Element;
use crate::find::Find;
use crate::result::{BromineError, BromineResult};

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Deadline and polling interval for a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    /// Maximum time to wait
    pub timeout: Duration,
    /// Pause between polls
    pub poll_interval: Duration,
}

impl Default for Wait {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl Wait {
    /// Create a wait
    #[must_use]
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Wait using the configured defaults
    #[must_use]
    pub const fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Duration::from_millis(config.wait_timeout_ms),
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    /// Poll `probe` until it yields a value.
    ///
    /// The probe always runs at least once.
    ///
    /// # Errors
    /// [`BromineError::Timeout`] after the deadline, or the probe's own error.
    pub fn poll<T>(
        &self,
        description: &str,
        mut probe: impl FnMut() -> BromineResult<Option<T>>,
    ) -> BromineResult<T> {
        let start = Instant::now();
        loop {
            if let Some(value) = probe()? {
                debug!(elapsed_ms = millis(start.elapsed()), "{description}");
                return Ok(value);
            }
            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Err(BromineError::Timeout {
                    ms: millis(self.timeout),
                    what: description.to_string(),
                });
            }
            std::thread::sleep(self.poll_interval.min(self.timeout - elapsed));
        }
    }

    /// Poll until `condition` holds; returns the time it took
    ///
    /// # Errors
    /// [`BromineError::Timeout`] after the deadline, or the condition's error.
    pub fn until(
        &self,
        description: &str,
        mut condition: impl FnMut() -> BromineResult<bool>,
    ) -> BromineResult<Duration> {
        let start = Instant::now();
        self.poll(description, || Ok(condition()?.then_some(())))?;
        Ok(start.elapsed())
    }

    /// Wait until `locator` resolves to an element
    ///
    /// # Errors
    /// [`BromineError::Timeout`] if it never resolves, or a collaborator fault.
    pub fn until_exists(&self, find: &Find, locator: &str) -> BromineResult<Element> {
        self.poll(&format!("element '{locator}' exists"), || {
            let element = find.element(locator)?;
            Ok(element.is_initialized().then_some(element))
        })
    }

    /// Wait until `locator` resolves to a displayed element
    ///
    /// # Errors
    /// [`BromineError::Timeout`] if it never becomes visible, or a collaborator fault.
    pub fn until_displayed(&self, find: &Find, locator: &str) -> BromineResult<Element> {
        self.poll(&format!("element '{locator}' displayed"), || {
            let element = find.element(locator)?;
            if element.is_initialized() && element.displayed()? {
                Ok(Some(element))
            } else {
                Ok(None)
            }
        })
    }
}
