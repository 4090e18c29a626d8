//! Failure-handling policies.
//!
//! | Policy | On failure | Output |
//! |--------|------------|--------|
//! | [`Verify`] | error log, listeners, `Err` | `BromineResult<()>` |
//! | [`ConditionalVerify`] | warning log, listeners | `()` |
//! | [`SoftVerify`] | error log, listeners, recorded | `()` |

use std::fmt::Debug;
use tracing::{error, warn};

use super::context::{VerifyContext, VerifyFailedEvent, VerifyFailure};
use super::outcome::Outcome;
use crate::result::{BromineError, BromineResult};

/// Predicate vocabulary shared by all policies.
///
/// Implementors only decide what [`apply`](Self::apply) does with an
/// [`Outcome`]; the predicates are provided.
pub trait Verifier {
    /// What a verification call returns
    type Output;

    /// Policy name used in logs, events and errors
    fn name(&self) -> &'static str;

    /// Handle an evaluated predicate
    fn apply(&self, outcome: Outcome) -> Self::Output;

    /// Pass when `passed` is true
    fn evaluate(&self, passed: bool, message: &str) -> Self::Output {
        self.apply(Outcome::evaluate(passed, message))
    }

    /// Condition must be true
    fn is_true(&self, condition: bool, message: &str) -> Self::Output {
        self.apply(Outcome::is_true(condition, message))
    }

    /// Condition must be false
    fn is_false(&self, condition: bool, message: &str) -> Self::Output {
        self.apply(Outcome::is_false(condition, message))
    }

    /// `actual` must equal `expected`
    fn equal<E, A>(&self, expected: E, actual: A, message: &str) -> Self::Output
    where
        E: Debug,
        A: PartialEq<E> + Debug,
    {
        self.apply(Outcome::equal(&expected, &actual, message))
    }

    /// `actual` must differ from `unexpected`
    fn not_equal<E, A>(&self, unexpected: E, actual: A, message: &str) -> Self::Output
    where
        E: Debug,
        A: PartialEq<E> + Debug,
    {
        self.apply(Outcome::not_equal(&unexpected, &actual, message))
    }

    /// Value must be absent
    fn is_null<T: Debug>(&self, value: &Option<T>, message: &str) -> Self::Output {
        self.apply(Outcome::is_null(value, message))
    }

    /// Value must be present
    fn not_null<T>(&self, value: &Option<T>, message: &str) -> Self::Output {
        self.apply(Outcome::not_null(value, message))
    }

    /// `haystack` must contain `needle`
    fn contains(&self, haystack: &str, needle: &str, message: &str) -> Self::Output {
        self.apply(Outcome::contains(haystack, needle, message))
    }

    /// `items` must contain `item`
    fn contains_item<T: PartialEq + Debug>(
        &self,
        items: &[T],
        item: &T,
        message: &str,
    ) -> Self::Output {
        self.apply(Outcome::contains_item(items, item, message))
    }

    /// `low <= value <= high`
    fn in_range<T: PartialOrd + Debug>(
        &self,
        value: T,
        low: T,
        high: T,
        message: &str,
    ) -> Self::Output {
        self.apply(Outcome::in_range(&value, &low, &high, message))
    }

    /// `value` must lie outside `[low, high]`
    fn not_in_range<T: PartialOrd + Debug>(
        &self,
        value: T,
        low: T,
        high: T,
        message: &str,
    ) -> Self::Output {
        self.apply(Outcome::not_in_range(&value, &low, &high, message))
    }

    /// Unconditional failure
    fn fail(&self, message: &str) -> Self::Output {
        self.apply(Outcome::fail(message))
    }
}

/// Fail-fast policy: a failure is returned as an error so `?` aborts the test.
#[derive(Debug, Clone, Default)]
pub struct Verify {
    context: VerifyContext,
}

impl Verify {
    /// Policy name
    pub const NAME: &'static str = "Verify";

    /// Create a policy reporting into `context`
    #[must_use]
    pub const fn new(context: VerifyContext) -> Self {
        Self { context }
    }
}

impl Verifier for Verify {
    type Output = BromineResult<()>;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, outcome: Outcome) -> BromineResult<()> {
        if outcome.passed {
            return Ok(());
        }
        error!(policy = Self::NAME, "{}", outcome.message);
        self.context
            .raise(&VerifyFailedEvent::new(Self::NAME, outcome.message.as_str()));
        Err(BromineError::VerifyFailed {
            policy: Self::NAME.to_string(),
            message: outcome.message,
        })
    }
}

/// Log-only policy: failures are logged as warnings and execution continues.
#[derive(Debug, Clone, Default)]
pub struct ConditionalVerify {
    context: VerifyContext,
}

impl ConditionalVerify {
    /// Policy name
    pub const NAME: &'static str = "ConditionalVerify";

    /// Create a policy reporting into `context`
    #[must_use]
    pub const fn new(context: VerifyContext) -> Self {
        Self { context }
    }
}

impl Verifier for ConditionalVerify {
    type Output = ();

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, outcome: Outcome) {
        if outcome.passed {
            return;
        }
        warn!(policy = Self::NAME, "{}", outcome.message);
        self.context
            .raise(&VerifyFailedEvent::new(Self::NAME, outcome.message));
    }
}

/// Accumulating policy.
///
/// Failures are logged and recorded; execution continues. The aggregate
/// failure is raised once by [`VerifyContext::finish`], normally when the
/// owning session is disposed.
#[derive(Debug, Clone, Default)]
pub struct SoftVerify {
    context: VerifyContext,
}

impl SoftVerify {
    /// Policy name
    pub const NAME: &'static str = "SoftVerify";

    /// Create a policy recording into `context`
    #[must_use]
    pub const fn new(context: VerifyContext) -> Self {
        Self { context }
    }

    /// True once any soft verification failed
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.context.has_failure()
    }

    /// Recorded failures, in order
    #[must_use]
    pub fn failures(&self) -> Vec<VerifyFailure> {
        self.context.failures()
    }
}

impl Verifier for SoftVerify {
    type Output = ();

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, outcome: Outcome) {
        if outcome.passed {
            return;
        }
        error!(policy = Self::NAME, "{}", outcome.message);
        self.context.record(Self::NAME, &outcome.message);
        self.context
            .raise(&VerifyFailedEvent::new(Self::NAME, outcome.message));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::LogCounter;
    use std::sync::{Arc, Mutex};

    fn collect_events(context: &VerifyContext) -> Arc<Mutex<Vec<VerifyFailedEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        context.on_verify_failed(move |e| sink.lock().unwrap().push(e.clone()));
        events
    }

    mod verify_tests {
        use super::*;

        fn run(verify: &Verify, reached: &mut bool) -> BromineResult<()> {
            verify.is_true(false, "first")?;
            *reached = true;
            Ok(())
        }

        #[test]
        fn test_failure_short_circuits() {
            let verify = Verify::new(VerifyContext::new());
            let mut reached = false;
            let err = run(&verify, &mut reached).unwrap_err();
            assert!(!reached);
            assert!(err.is_verify_failure());
            assert_eq!(err.to_string(), "Verify failed: first: expected true, got false");
        }

        #[test]
        fn test_pass_is_silent() {
            let counter = LogCounter::new();
            let verify = Verify::default();
            counter.scope(|| {
                verify.equal("Go", String::from("Go"), "label").unwrap();
                verify.in_range(3, 1, 5, "range").unwrap();
            });
            assert_eq!(counter.total(), 0);
        }

        #[test]
        fn test_failure_logged_once_and_not_recorded() {
            let context = VerifyContext::new();
            let events = collect_events(&context);
            let verify = Verify::new(context.clone());
            let counter = LogCounter::new();
            let result = counter.scope(|| verify.fail("boom"));
            assert!(result.is_err());
            assert_eq!(counter.errors(), 1);
            assert_eq!(events.lock().unwrap().len(), 1);
            assert!(!context.has_failure());
        }
    }

    mod conditional_tests {
        use super::*;

        #[test]
        fn test_failure_continues_with_warning() {
            let context = VerifyContext::new();
            let events = collect_events(&context);
            let conditional = ConditionalVerify::new(context.clone());
            let counter = LogCounter::new();
            counter.scope(|| {
                conditional.is_false(true, "one");
                conditional.not_null::<u8>(&None, "two");
            });
            assert_eq!(counter.warnings(), 2);
            assert_eq!(counter.errors(), 0);
            assert_eq!(events.lock().unwrap()[0].policy, "ConditionalVerify");
            assert!(!context.has_failure());
            assert!(context.finish().is_ok());
        }
    }

    mod soft_tests {
        use super::*;

        #[test]
        fn test_failures_accumulate_in_order() {
            let context = VerifyContext::new();
            let soft = SoftVerify::new(context.clone());
            let counter = LogCounter::new();
            counter.scope(|| {
                for i in 0..3 {
                    soft.equal(1, 2, &format!("check {i}"));
                }
            });
            assert!(soft.has_failure());
            let failures = soft.failures();
            assert_eq!(failures.len(), 3);
            assert_eq!(failures[2].message, "check 2: expected 1, got 2");
            assert_eq!(counter.errors(), 3);
        }

        #[test]
        fn test_passes_keep_flag_clear() {
            let soft = SoftVerify::default();
            soft.is_true(true, "ok");
            soft.contains("Submit Now", "Now", "text");
            assert!(!soft.has_failure());
            assert!(soft.failures().is_empty());
        }

        #[test]
        fn test_flag_sticky_after_pass() {
            let soft = SoftVerify::default();
            soft.fail("broken");
            soft.is_true(true, "fine");
            assert!(soft.has_failure());
        }

        #[test]
        fn test_aggregate_raised_once() {
            let context = VerifyContext::new();
            let soft = SoftVerify::new(context.clone());
            soft.fail("a");
            soft.fail("b");
            let err = context.finish().unwrap_err();
            assert_eq!(
                err.to_string(),
                "One or more soft verify statements failed (2)"
            );
            assert!(context.finish().is_ok());
        }
    }

    mod listener_tests {
        use super::*;

        #[test]
        fn test_all_policies_notify_shared_listeners() {
            let context = VerifyContext::new();
            let events = collect_events(&context);
            let _ = Verify::new(context.clone()).fail("hard");
            ConditionalVerify::new(context.clone()).fail("conditional");
            SoftVerify::new(context.clone()).fail("soft");
            let policies: Vec<String> = events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.policy.clone())
                .collect();
            assert_eq!(policies, vec!["Verify", "ConditionalVerify", "SoftVerify"]);
            assert_eq!(context.failure_count(), 1);
        }

        #[test]
        fn test_passes_do_not_notify() {
            let context = VerifyContext::new();
            let events = collect_events(&context);
            let _ = Verify::new(context.clone()).is_true(true, "");
            SoftVerify::new(context).contains_item(&[1, 2], &1, "");
            assert!(events.lock().unwrap().is_empty());
        }
    }
}
