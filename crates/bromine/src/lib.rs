//! Bromine: browser test support with cascading locators and layered verification
//!
//! Bromine sits between a test and a browser driver. It resolves loosely
//! specified locator strings by trying several strategies in a fixed order,
//! and it checks conditions under three failure policies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Session                                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌──────────────────┐      │
//! │   │ Find       │    │ Element    │    │ BrowserDriver    │      │
//! │   │ (cascade)  │───►│ Found /    │───►│ (WebDriver,      │      │
//! │   │            │    │ NotFound   │    │  MockDriver)     │      │
//! │   └────────────┘    └────────────┘    └──────────────────┘      │
//! │   ┌────────────┐ ┌───────────────────┐ ┌────────────┐           │
//! │   │ Verify     │ │ ConditionalVerify │ │ SoftVerify │           │
//! │   └─────┬──────┘ └─────────┬─────────┘ └─────┬──────┘           │
//! │         └──────────────────┼─────────────────┘                  │
//! │                      VerifyContext                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use bromine::prelude::*;
//! use bromine::mock::{MockDriver, MockNode};
//! use std::sync::Arc;
//!
//! let driver = MockDriver::new();
//! let body = driver.append(driver.root(), MockNode::new("body"));
//! driver.append(body, MockNode::new("button").id("submit").text("Submit Now"));
//!
//! let session = Session::new(Arc::new(driver), SessionConfig::default()).unwrap();
//! let by_css = session.find().element("#submit").unwrap();
//! let by_text = session.find().element("Submit Now").unwrap();
//! assert_eq!(by_css.info().strategy, LocatorStrategy::Css);
//! assert_eq!(by_text.info().strategy, LocatorStrategy::Text);
//!
//! session.verify().is_true(by_css.enabled().unwrap(), "submit enabled").unwrap();
//! session.dispose().unwrap();
//! ```

#![warn(missing_docs)]

mod config;
mod driver;
mod element;
mod find;
mod locator;
mod result;
mod session;
mod wait;

/// Subscriber setup and log-event counting
pub mod logging;

/// In-memory driver for tests
pub mod mock;

/// Verification policies
pub mod verify;

pub use config::{BrowserType, SessionConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
pub use driver::{BrowserDriver, NativeElement, NativeHandle, SearchContext};
pub use element::Element;
pub use find::Find;
pub use locator::{
    classes_selector, CallingInformation, LocatorStrategy, Point, Rect, Size, CASCADE_ORDER,
    PARENT_XPATH,
};
pub use logging::{LogCounter, LogLevel};
pub use result::{BromineError, BromineResult};
pub use session::Session;
pub use verify::{
    ConditionalVerify, Outcome, SoftVerify, Verifier, Verify, VerifyContext, VerifyFailedEvent,
    VerifyFailure,
};
pub use wait::Wait;

/// Commonly used types
pub mod prelude {
    pub use super::{
        BromineError, BromineResult, ConditionalVerify, Element, Find, LocatorStrategy, Session,
        SessionConfig, SoftVerify, Verifier, Verify, VerifyContext, Wait,
    };
}
