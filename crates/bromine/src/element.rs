//! Located elements.
//!
//! An [`Element`] is either `Found` (a native handle plus how it was found)
//! or `NotFound` (only the record of the attempt). Every accessor works on
//! both: on `NotFound` it logs an error and returns a neutral default
//! (empty string, `false`, zero point/size) and mutators become no-ops.
//! Faults reported by the driver for a `Found` element are propagated.

use tracing::{error, warn};

use crate::driver::{NativeHandle, SearchContext};
use crate::locator::{CallingInformation, LocatorStrategy, Point, Rect, Size, PARENT_XPATH};
use crate::result::BromineResult;

/// A resolution result
#[derive(Debug, Clone)]
pub enum Element {
    /// The locator matched a native element
    Found {
        /// Driver handle
        handle: NativeHandle,
        /// How the element was located
        info: CallingInformation,
    },
    /// The locator matched nothing
    NotFound {
        /// The attempted lookup
        info: CallingInformation,
    },
}

impl Element {
    /// Wrap a native handle
    #[must_use]
    pub fn found(handle: NativeHandle, info: CallingInformation) -> Self {
        Self::Found { handle, info }
    }

    /// An element standing in for "nothing matched"
    #[must_use]
    pub fn not_found(locator: impl Into<String>, calling_method: impl Into<String>) -> Self {
        Self::NotFound {
            info: CallingInformation::unresolved(locator, calling_method),
        }
    }

    /// How this element was located
    #[must_use]
    pub const fn info(&self) -> &CallingInformation {
        match self {
            Self::Found { info, .. } | Self::NotFound { info } => info,
        }
    }

    /// Whether a native element backs this value
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The native handle, if any
    #[must_use]
    pub const fn handle(&self) -> Option<&NativeHandle> {
        match self {
            Self::Found { handle, .. } => Some(handle),
            Self::NotFound { .. } => None,
        }
    }

    fn read<T>(
        &self,
        what: &str,
        default: T,
        f: impl FnOnce(&NativeHandle) -> BromineResult<T>,
    ) -> BromineResult<T> {
        match self {
            Self::Found { handle, .. } => f(handle),
            Self::NotFound { info } => {
                error!(
                    locator = %info.locator,
                    "Unable to find the {what} for the requested element"
                );
                Ok(default)
            }
        }
    }

    fn act(&self, what: &str, f: impl FnOnce(&NativeHandle) -> BromineResult<()>) -> BromineResult<()> {
        match self {
            Self::Found { handle, .. } => f(handle),
            Self::NotFound { info } => {
                error!(locator = %info.locator, "Unable to {what} the requested element");
                Ok(())
            }
        }
    }

    /// Tag name (empty when not found)
    pub fn tag_name(&self) -> BromineResult<String> {
        self.read("tag", String::new(), |h| h.tag_name())
    }

    /// Rendered text (empty when not found)
    pub fn text(&self) -> BromineResult<String> {
        self.read("text", String::new(), |h| h.text())
    }

    /// Whether the element can be interacted with (`false` when not found)
    pub fn enabled(&self) -> BromineResult<bool> {
        self.read("enabled property", false, |h| h.is_enabled())
    }

    /// Selected state (`false` when not found)
    pub fn selected(&self) -> BromineResult<bool> {
        self.read("selected property", false, |h| h.is_selected())
    }

    /// Whether the element is in view (`false` when not found)
    pub fn displayed(&self) -> BromineResult<bool> {
        self.read("displayed property", false, |h| h.is_displayed())
    }

    /// Location in the rendered page (origin when not found)
    pub fn location(&self) -> BromineResult<Point> {
        self.read("location", Point::default(), |h| h.location())
    }

    /// Rendered size (zero when not found)
    pub fn size(&self) -> BromineResult<Size> {
        self.read("size", Size::default(), |h| h.size())
    }

    /// Location and size together (zero rect when not found)
    pub fn rect(&self) -> BromineResult<Rect> {
        match self {
            Self::Found { handle, .. } => Ok(Rect::new(handle.location()?, handle.size()?)),
            Self::NotFound { .. } => self.read("bounds", Rect::default(), |_| Ok(Rect::default())),
        }
    }

    /// Attribute value (empty when absent or not found)
    pub fn attribute(&self, name: &str) -> BromineResult<String> {
        self.read(&format!("attribute {name}"), String::new(), |h| {
            Ok(h.attribute(name)?.unwrap_or_default())
        })
    }

    /// Computed CSS value (empty when not found)
    pub fn css_value(&self, name: &str) -> BromineResult<String> {
        self.read(&format!("CSS value {name}"), String::new(), |h| {
            h.css_value(name)
        })
    }

    /// DOM property value (empty when absent or not found)
    pub fn property(&self, name: &str) -> BromineResult<String> {
        self.read(&format!("property {name}"), String::new(), |h| {
            Ok(h.property(name)?.unwrap_or_default())
        })
    }

    /// Clear a user-editable element
    pub fn clear(&self) -> BromineResult<()> {
        self.act("clear", |h| h.clear())
    }

    /// Click the element
    pub fn click(&self) -> BromineResult<()> {
        self.act("click", |h| h.click())
    }

    /// Type text into the element
    pub fn send_keys(&self, text: &str) -> BromineResult<()> {
        self.act(&format!("send keys {text} to"), |h| h.send_keys(text))
    }

    /// Submit the form the element belongs to
    pub fn submit(&self) -> BromineResult<()> {
        self.act("submit to", |h| h.submit())
    }

    /// The structural parent of this element.
    ///
    /// Returns `NotFound` when called on a `NotFound` element or on the
    /// document root.
    pub fn parent_element(&self) -> BromineResult<Self> {
        const OPERATION: &str = "Element::parent_element";
        match self {
            Self::Found { handle, .. } => {
                let parent = handle
                    .find_native(LocatorStrategy::XPath, PARENT_XPATH)?
                    .into_iter()
                    .next();
                Ok(match parent {
                    Some(handle) => Self::found(
                        handle,
                        CallingInformation::new(PARENT_XPATH, LocatorStrategy::XPath, OPERATION),
                    ),
                    None => {
                        warn!("The requested element has no parent element");
                        Self::not_found(PARENT_XPATH, OPERATION)
                    }
                })
            }
            Self::NotFound { info } => {
                error!(
                    locator = %info.locator,
                    "Unable to find the parent of the requested element"
                );
                Ok(Self::not_found(PARENT_XPATH, OPERATION))
            }
        }
    }

    /// First descendant matching `locator` with a single strategy
    pub fn find_element(&self, strategy: LocatorStrategy, locator: &str) -> BromineResult<Self> {
        const OPERATION: &str = "Element::find_element";
        let first = self.find_with(strategy, locator, OPERATION)?.into_iter().next();
        Ok(first.unwrap_or_else(|| Self::not_found(locator, OPERATION)))
    }

    /// Every descendant matching `locator` with a single strategy
    pub fn find_elements(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> BromineResult<Vec<Self>> {
        self.find_with(strategy, locator, "Element::find_elements")
    }

    fn find_with(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
        operation: &str,
    ) -> BromineResult<Vec<Self>> {
        match self {
            Self::Found { handle, .. } => {
                crate::find::lookup(handle.as_ref(), strategy, locator, operation)
            }
            Self::NotFound { info } => {
                error!(
                    locator = %info.locator,
                    child = locator,
                    "Unable to search inside the requested element"
                );
                Ok(Vec::new())
            }
        }
    }
}

impl SearchContext for Element {
    fn find_native(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> BromineResult<Vec<NativeHandle>> {
        match self {
            Self::Found { handle, .. } => handle.find_native(strategy, locator),
            Self::NotFound { .. } => Ok(Vec::new()),
        }
    }
}
