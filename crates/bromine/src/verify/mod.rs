//! Verification policies.
//!
//! A predicate is evaluated into an [`Outcome`]; the policy then decides
//! what a failure means. All three policies of a session share one
//! [`VerifyContext`], so listeners see every failure and the soft-failure
//! log survives until the session is disposed.
//!
//! ```rust
//! use bromine::verify::{SoftVerify, Verifier, VerifyContext};
//!
//! let context = VerifyContext::new();
//! let soft = SoftVerify::new(context.clone());
//! soft.equal(1, 2, "first");
//! soft.is_true(true, "second");
//!
//! assert!(soft.has_failure());
//! assert!(context.finish().is_err());
//! assert!(context.finish().is_ok());
//! ```

mod context;
mod outcome;
mod policy;

pub use context::{SoftState, VerifyContext, VerifyFailedEvent, VerifyFailure, VerifyListener};
pub use outcome::Outcome;
pub use policy::{ConditionalVerify, SoftVerify, Verifier, Verify};
