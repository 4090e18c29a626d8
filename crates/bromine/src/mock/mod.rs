//! Mock driver for testing without a browser.
//!
//! [`MockDriver`] serves an in-memory DOM built with [`MockNode`]s and
//! implements the full driver contract, including collaborator faults:
//! removing a node makes its handles stale, and quitting the driver closes
//! the session for every outstanding handle.
//!
//! ## Example
//!
//! ```rust
//! use bromine::mock::{MockDriver, MockNode};
//! use bromine::{Find, LocatorStrategy};
//! use std::sync::Arc;
//!
//! let driver = MockDriver::new();
//! let body = driver.append(driver.root(), MockNode::new("body"));
//! driver.append(body, MockNode::new("button").id("submit").text("Submit Now"));
//!
//! let find = Find::new(Arc::new(driver));
//! let button = find.element("#submit").unwrap();
//! assert_eq!(button.info().strategy, LocatorStrategy::Css);
//! ```

mod dom;
mod selector;

pub use dom::{MockDom, MockDriver, MockElement, MockNode, NodeId};
