//! Browser driver collaborator.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BrowserDriver (document scope)     NativeElement (subtree)  │
//! │          │                                   │               │
//! │          └──────────── SearchContext ────────┘               │
//! │                 find_native(strategy, locator)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bromine never speaks the automation protocol itself. A driver hands back
//! opaque [`NativeHandle`]s; every call on them may fail with a collaborator
//! fault (stale handle, closed session) which the library propagates as-is.
//! [`crate::mock::MockDriver`] implements these traits over an in-memory DOM.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::locator::{LocatorStrategy, Point, Size};
use crate::result::BromineResult;

/// Shared, opaque reference to an element owned by the driver
pub type NativeHandle = Arc<dyn NativeElement>;

/// Something elements can be searched in: the whole document or one subtree
pub trait SearchContext {
    /// Locate elements with a single strategy.
    ///
    /// Returns an empty `Vec` when nothing matches. Returns
    /// [`BromineError::InvalidSelector`](crate::BromineError::InvalidSelector)
    /// when the locator is not valid for `strategy`.
    fn find_native(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> BromineResult<Vec<NativeHandle>>;
}

/// Accessors and mutators of a located element
pub trait NativeElement: SearchContext + Debug + Send + Sync {
    /// Lower-case tag name
    fn tag_name(&self) -> BromineResult<String>;

    /// Rendered text of the element and its descendants
    fn text(&self) -> BromineResult<String>;

    /// Whether the element accepts interaction
    fn is_enabled(&self) -> BromineResult<bool>;

    /// Whether an option, checkbox or radio is selected
    fn is_selected(&self) -> BromineResult<bool>;

    /// Whether the element is rendered visibly
    fn is_displayed(&self) -> BromineResult<bool>;

    /// Top-left corner in page coordinates
    fn location(&self) -> BromineResult<Point>;

    /// Rendered size
    fn size(&self) -> BromineResult<Size>;

    /// HTML attribute value
    fn attribute(&self, name: &str) -> BromineResult<Option<String>>;

    /// DOM property value
    fn property(&self, name: &str) -> BromineResult<Option<String>>;

    /// Computed CSS value
    fn css_value(&self, name: &str) -> BromineResult<String>;

    /// Clear an editable element
    fn clear(&self) -> BromineResult<()>;

    /// Click the element
    fn click(&self) -> BromineResult<()>;

    /// Type text into the element
    fn send_keys(&self, text: &str) -> BromineResult<()>;

    /// Submit the form the element belongs to
    fn submit(&self) -> BromineResult<()>;
}

/// One browser automation session
pub trait BrowserDriver: SearchContext + Debug + Send + Sync {
    /// Human-readable driver name, used in logs
    fn name(&self) -> &str;

    /// Configure how long element lookups wait for the DOM
    fn set_implicit_wait(&self, wait: Duration) -> BromineResult<()> {
        let _ = wait;
        Ok(())
    }

    /// End the session. Further calls fail with a collaborator fault.
    fn quit(&self) -> BromineResult<()> {
        Ok(())
    }
}
