//! Pure predicate evaluation.
//!
//! Every predicate of the verification vocabulary produces an [`Outcome`];
//! what happens to a failed outcome is decided separately by a policy.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Result of evaluating one predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the predicate held
    pub passed: bool,
    /// Failure description (empty for a pass)
    pub message: String,
}

fn describe(message: &str, detail: impl AsRef<str>) -> String {
    if message.is_empty() {
        detail.as_ref().to_string()
    } else {
        format!("{message}: {}", detail.as_ref())
    }
}

impl Outcome {
    /// A passing outcome
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// A failing outcome
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Pass or fail with `message` as the failure description
    #[must_use]
    pub fn evaluate(passed: bool, message: &str) -> Self {
        if passed {
            Self::pass()
        } else {
            Self::fail(describe(message, "verification failed"))
        }
    }

    /// Condition must be true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> Self {
        if condition {
            Self::pass()
        } else {
            Self::fail(describe(message, "expected true, got false"))
        }
    }

    /// Condition must be false
    #[must_use]
    pub fn is_false(condition: bool, message: &str) -> Self {
        if condition {
            Self::fail(describe(message, "expected false, got true"))
        } else {
            Self::pass()
        }
    }

    /// `actual` must equal `expected`
    #[must_use]
    pub fn equal<E, A>(expected: &E, actual: &A, message: &str) -> Self
    where
        E: Debug + ?Sized,
        A: PartialEq<E> + Debug + ?Sized,
    {
        if actual == expected {
            Self::pass()
        } else {
            Self::fail(describe(
                message,
                format!("expected {expected:?}, got {actual:?}"),
            ))
        }
    }

    /// `actual` must differ from `unexpected`
    #[must_use]
    pub fn not_equal<E, A>(unexpected: &E, actual: &A, message: &str) -> Self
    where
        E: Debug + ?Sized,
        A: PartialEq<E> + Debug + ?Sized,
    {
        if actual == unexpected {
            Self::fail(describe(
                message,
                format!("expected a value other than {unexpected:?}"),
            ))
        } else {
            Self::pass()
        }
    }

    /// Value must be absent
    #[must_use]
    pub fn is_null<T: Debug>(value: &Option<T>, message: &str) -> Self {
        match value {
            None => Self::pass(),
            Some(v) => Self::fail(describe(message, format!("expected None, got Some({v:?})"))),
        }
    }

    /// Value must be present
    #[must_use]
    pub fn not_null<T>(value: &Option<T>, message: &str) -> Self {
        if value.is_some() {
            Self::pass()
        } else {
            Self::fail(describe(message, "expected Some, got None"))
        }
    }

    /// `haystack` must contain `needle`
    #[must_use]
    pub fn contains(haystack: &str, needle: &str, message: &str) -> Self {
        if haystack.contains(needle) {
            Self::pass()
        } else {
            Self::fail(describe(
                message,
                format!("expected '{haystack}' to contain '{needle}'"),
            ))
        }
    }

    /// `items` must contain `item`
    #[must_use]
    pub fn contains_item<T: PartialEq + Debug>(items: &[T], item: &T, message: &str) -> Self {
        if items.contains(item) {
            Self::pass()
        } else {
            Self::fail(describe(
                message,
                format!("expected {items:?} to contain {item:?}"),
            ))
        }
    }

    /// `low <= value <= high`
    #[must_use]
    pub fn in_range<T: PartialOrd + Debug>(value: &T, low: &T, high: &T, message: &str) -> Self {
        if value >= low && value <= high {
            Self::pass()
        } else {
            Self::fail(describe(
                message,
                format!("expected {value:?} to be in range [{low:?}, {high:?}]"),
            ))
        }
    }

    /// `value < low || value > high`
    #[must_use]
    pub fn not_in_range<T: PartialOrd + Debug>(
        value: &T,
        low: &T,
        high: &T,
        message: &str,
    ) -> Self {
        if value >= low && value <= high {
            Self::fail(describe(
                message,
                format!("expected {value:?} to be outside range [{low:?}, {high:?}]"),
            ))
        } else {
            Self::pass()
        }
    }
}
