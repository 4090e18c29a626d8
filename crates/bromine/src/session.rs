//! Test session.
//!
//! A [`Session`] is the scope of one browser test: it owns the driver, the
//! resolver and one [`VerifyContext`] shared by the three policies. Soft
//! failures recorded during the test are raised once, when the session is
//! disposed.
//!
//! ```rust
//! use bromine::mock::{MockDriver, MockNode};
//! use bromine::{Session, SessionConfig, Verifier};
//! use std::sync::Arc;
//!
//! let driver = MockDriver::new();
//! driver.append(driver.root(), MockNode::new("h1").text("Welcome"));
//!
//! let session = Session::new(Arc::new(driver), SessionConfig::default()).unwrap();
//! let heading = session.find().element("h1").unwrap();
//! session.soft_verify().equal("Welcome", heading.text().unwrap(), "heading");
//! session.dispose().unwrap();
//! ```

use std::sync::Arc;
use tracing::{info, info_span, warn, Span};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::driver::BrowserDriver;
use crate::find::Find;
use crate::result::{BromineError, BromineResult};
use crate::verify::{ConditionalVerify, SoftVerify, Verify, VerifyContext, VerifyFailedEvent};
use crate::wait::Wait;

/// One browser test: driver, resolver and verification policies
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    driver: Arc<dyn BrowserDriver>,
    find: Find,
    context: VerifyContext,
    verify: Verify,
    conditional: ConditionalVerify,
    soft: SoftVerify,
    span: Span,
    disposed: bool,
}

impl Session {
    /// Start a session over `driver`.
    ///
    /// Applies the configured implicit wait to the driver.
    ///
    /// # Errors
    /// Returns error if the config is invalid or the driver rejects the
    /// implicit wait.
    pub fn new(driver: Arc<dyn BrowserDriver>, config: SessionConfig) -> BromineResult<Self> {
        config.validate()?;
        let id = Uuid::new_v4();
        let span = info_span!("session", id = %id);
        span.in_scope(|| {
            if let Some(wait) = config.implicit_wait() {
                driver.set_implicit_wait(wait)?;
            }
            info!(driver = driver.name(), browser = %config.browser, "Session started");
            Ok::<_, BromineError>(())
        })?;

        let context = VerifyContext::new();
        Ok(Self {
            id,
            find: Find::new(Arc::clone(&driver)),
            verify: Verify::new(context.clone()),
            conditional: ConditionalVerify::new(context.clone()),
            soft: SoftVerify::new(context.clone()),
            context,
            config,
            driver,
            span,
            disposed: false,
        })
    }

    /// Unique session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Options the session was started with
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    /// Element resolver
    #[must_use]
    pub const fn find(&self) -> &Find {
        &self.find
    }

    /// Fail-fast policy
    #[must_use]
    pub const fn verify(&self) -> &Verify {
        &self.verify
    }

    /// Log-only policy
    #[must_use]
    pub const fn conditional_verify(&self) -> &ConditionalVerify {
        &self.conditional
    }

    /// Accumulating policy
    #[must_use]
    pub const fn soft_verify(&self) -> &SoftVerify {
        &self.soft
    }

    /// Verification state shared by the policies
    #[must_use]
    pub const fn context(&self) -> &VerifyContext {
        &self.context
    }

    /// Wait with the configured timeout and polling interval
    #[must_use]
    pub const fn wait(&self) -> Wait {
        Wait::from_config(&self.config)
    }

    /// Subscribe to failures of every policy of this session
    pub fn on_verify_failed<F>(&self, listener: F)
    where
        F: Fn(&VerifyFailedEvent) + Send + Sync + 'static,
    {
        self.context.on_verify_failed(listener);
    }

    /// Run `f` inside the session's tracing span
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    /// End the session.
    ///
    /// The driver is always quit; the aggregate soft failure takes
    /// precedence over a quit error.
    ///
    /// # Errors
    /// [`BromineError::SoftVerifyFailed`]
    /// if any soft verification failed, otherwise any error from quitting.
    pub fn dispose(mut self) -> BromineResult<()> {
        self.disposed = true;
        let _entered = self.span.enter();
        let soft = self.context.finish();
        let quit = self.driver.quit();
        info!(failures = self.context.failure_count(), "Session disposed");
        soft?;
        quit
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        let _entered = self.span.enter();
        if let Err(err) = self.driver.quit() {
            warn!(error = %err, "Failed to quit driver");
        }
        if std::thread::panicking() {
            return;
        }
        if let Err(err) = self.context.finish() {
            panic!("{err}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockNode};
    use crate::verify::Verifier;
    use std::sync::Mutex;
    use std::time::Duration;

    fn session() -> (MockDriver, Session) {
        let driver = MockDriver::new();
        let body = driver.append(driver.root(), MockNode::new("body"));
        driver.append(body, MockNode::new("button").id("submit").text("Submit Now"));
        let session = Session::new(Arc::new(driver.clone()), SessionConfig::default()).unwrap();
        (driver, session)
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_implicit_wait_applied() {
            let driver = MockDriver::new();
            let config = SessionConfig::default().with_implicit_wait_secs(4);
            let _session = Session::new(Arc::new(driver.clone()), config).unwrap();
            assert_eq!(driver.implicit_wait(), Some(Duration::from_secs(4)));
        }

        #[test]
        fn test_no_implicit_wait_by_default() {
            let (driver, session) = session();
            assert_eq!(driver.implicit_wait(), None);
            session.dispose().unwrap();
        }

        #[test]
        fn test_launch_options_available_to_driver() {
            let config = SessionConfig::default()
                .with_headless(true)
                .with_remote_address("http://grid:4444");
            let session = Session::new(Arc::new(MockDriver::new()), config).unwrap();
            assert!(session.config().headless);
            assert_eq!(
                session.config().remote_address.as_deref(),
                Some("http://grid:4444")
            );
            assert_eq!(session.driver().name(), "mock");
            session.dispose().unwrap();
        }

        #[test]
        fn test_invalid_config_rejected() {
            let config = SessionConfig::default().with_wait(100, 0);
            let err = Session::new(Arc::new(MockDriver::new()), config).unwrap_err();
            assert!(matches!(err, BromineError::Config { .. }));
        }

        #[test]
        fn test_clean_dispose_quits_driver() {
            let (driver, session) = session();
            assert!(session.find().element("#submit").unwrap().is_initialized());
            session.dispose().unwrap();
            assert!(driver.is_closed());
        }

        #[test]
        fn test_drop_quits_driver() {
            let (driver, session) = session();
            drop(session);
            assert!(driver.is_closed());
        }

        #[test]
        fn test_ids_unique() {
            let (_, a) = session();
            let (_, b) = session();
            assert_ne!(a.id(), b.id());
            assert_eq!(a.wait().timeout, Duration::from_millis(5_000));
        }
    }

    mod span_tests {
        use super::*;
        use crate::logging::LogCounter;

        #[test]
        fn test_in_scope_enters_session_span() {
            let counter = LogCounter::new();
            let (name, result) = counter.scope(|| {
                let (_, session) = session();
                let name = session.in_scope(|| {
                    tracing::Span::current().metadata().map(|m| m.name())
                });
                (name, session.dispose())
            });
            assert_eq!(name, Some("session"));
            assert!(result.is_ok());
        }
    }

    mod soft_failure_tests {
        use super::*;

        #[test]
        fn test_dispose_reports_soft_failures() {
            let (driver, session) = session();
            session.soft_verify().equal(1, 2, "first");
            session.soft_verify().is_true(false, "second");
            let err = session.dispose().unwrap_err();
            match err {
                BromineError::SoftVerifyFailed { count, failures } => {
                    assert_eq!(count, 2);
                    assert_eq!(failures[0], "first: expected 1, got 2");
                }
                other => panic!("unexpected error: {other}"),
            }
            assert!(driver.is_closed());
        }

        #[test]
        fn test_conditional_failures_do_not_fail_session() {
            let (_, session) = session();
            session.conditional_verify().fail("only logged");
            assert!(session.verify().is_true(false, "hard").is_err());
            session.dispose().unwrap();
        }

        #[test]
        fn test_failure_after_mid_session_finish_reported_at_dispose() {
            let (_, session) = session();
            session.soft_verify().fail("early");
            assert!(session.context().finish().is_err());
            session.soft_verify().equal(1, 2, "late");
            match session.dispose().unwrap_err() {
                BromineError::SoftVerifyFailed { count, failures } => {
                    assert_eq!(count, 1);
                    assert_eq!(failures, vec!["late: expected 1, got 2".to_string()]);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        #[should_panic(expected = "One or more soft verify statements failed (1)")]
        fn test_drop_with_soft_failure_panics() {
            let (_, session) = session();
            session.soft_verify().fail("unreported");
        }

        #[test]
        fn test_listener_sees_all_policies() {
            let (_, session) = session();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            session.on_verify_failed(move |e| sink.lock().unwrap().push(e.policy.clone()));
            let _ = session.verify().fail("a");
            session.conditional_verify().fail("b");
            session.soft_verify().fail("c");
            assert_eq!(seen.lock().unwrap().len(), 3);
            assert!(session.dispose().is_err());
        }
    }
}
