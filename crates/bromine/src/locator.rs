//! Locator strategies and the record of how an element was found.
//!
//! # Design Philosophy
//!
//! - **Loose locators**: callers hand over a plain string; its meaning is
//!   decided by the cascade in [`crate::Find`], not fixed in advance
//! - **Traceable results**: every element carries a [`CallingInformation`]
//!   naming the strategy that actually matched
//! - **Ordering is policy**: [`CASCADE_ORDER`] is a constant, not an
//!   emergent property of the resolver code

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategies tried by the cascade, first non-empty result wins
pub const CASCADE_ORDER: [LocatorStrategy; 5] = [
    LocatorStrategy::Css,
    LocatorStrategy::Id,
    LocatorStrategy::Class,
    LocatorStrategy::Text,
    LocatorStrategy::PartialText,
];

/// Locator used to reach the structural parent of an element
pub const PARENT_XPATH: &str = "..";

/// One interpretation of a locator string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocatorStrategy {
    /// Not resolved
    #[default]
    Undefined,
    /// Exact `id` attribute
    Id,
    /// Single class token
    Class,
    /// CSS selector
    Css,
    /// Tag name
    Tag,
    /// Exact visible text
    Text,
    /// Visible text containing the locator
    PartialText,
    /// XPath expression
    XPath,
}

impl LocatorStrategy {
    /// Get the strategy name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Id => "Id",
            Self::Class => "Class",
            Self::Css => "Css",
            Self::Tag => "Tag",
            Self::Text => "Text",
            Self::PartialText => "PartialText",
            Self::XPath => "XPath",
        }
    }

    /// Whether this is the unresolved zero value
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether the cascade may try this strategy for `locator`.
    ///
    /// A locator with whitespace is never a single class token, so the
    /// class strategy is skipped for it.
    #[must_use]
    pub fn applies_to(&self, locator: &str) -> bool {
        match self {
            Self::Class => !locator.chars().any(char::is_whitespace),
            Self::Undefined => false,
            _ => true,
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable record of how an element was located
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallingInformation {
    /// Locator string handed to the resolver
    pub locator: String,
    /// Strategy that produced the element (`Undefined` when nothing matched)
    pub strategy: LocatorStrategy,
    /// When the element was constructed
    pub called_at: DateTime<Local>,
    /// Operation or caller-supplied label that requested the element
    pub calling_method: String,
}

impl CallingInformation {
    /// Record a resolved element
    #[must_use]
    pub fn new(
        locator: impl Into<String>,
        strategy: LocatorStrategy,
        calling_method: impl Into<String>,
    ) -> Self {
        Self {
            locator: locator.into(),
            strategy,
            called_at: Local::now(),
            calling_method: calling_method.into(),
        }
    }

    /// Record a locator that matched nothing
    #[must_use]
    pub fn unresolved(locator: impl Into<String>, calling_method: impl Into<String>) -> Self {
        Self::new(locator, LocatorStrategy::Undefined, calling_method)
    }

    /// Same locator string and strategy, ignoring when and by whom
    #[must_use]
    pub fn same_origin(&self, other: &Self) -> bool {
        self.locator == other.locator && self.strategy == other.strategy
    }
}

/// A point in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rendered element size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Size {
    /// Create a new size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Location plus size of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub origin: Point,
    /// Extent
    pub size: Size,
}

impl Rect {
    /// Create a new rect
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Check if a point lies inside the rect
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let right = i64::from(self.origin.x) + i64::from(self.size.width);
        let bottom = i64::from(self.origin.y) + i64::from(self.size.height);
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && i64::from(point.x) < right
            && i64::from(point.y) < bottom
    }
}

/// Build a compound CSS selector requiring every class token.
///
/// `"btn primary"` becomes `".btn.primary"`. Runs of whitespace are treated
/// as a single separator.
#[must_use]
pub fn classes_selector(classes: &str) -> String {
    classes
        .split_whitespace()
        .fold(String::new(), |mut selector, class| {
            selector.push('.');
            selector.push_str(class);
            selector
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_default_is_undefined() {
            assert_eq!(LocatorStrategy::default(), LocatorStrategy::Undefined);
            assert!(LocatorStrategy::default().is_undefined());
        }

        #[test]
        fn test_cascade_order() {
            assert_eq!(
                CASCADE_ORDER,
                [
                    LocatorStrategy::Css,
                    LocatorStrategy::Id,
                    LocatorStrategy::Class,
                    LocatorStrategy::Text,
                    LocatorStrategy::PartialText,
                ]
            );
        }

        #[test]
        fn test_class_skipped_for_whitespace() {
            assert!(LocatorStrategy::Class.applies_to("primary"));
            assert!(!LocatorStrategy::Class.applies_to("btn primary"));
            assert!(!LocatorStrategy::Class.applies_to("btn\tprimary"));
            assert!(LocatorStrategy::Text.applies_to("Submit Now"));
        }

        #[test]
        fn test_display() {
            assert_eq!(LocatorStrategy::PartialText.to_string(), "PartialText");
            assert_eq!(LocatorStrategy::XPath.to_string(), "XPath");
        }
    }

    mod calling_information_tests {
        use super::*;

        #[test]
        fn test_unresolved() {
            let info = CallingInformation::unresolved("#missing", "Find::element");
            assert!(info.strategy.is_undefined());
            assert_eq!(info.locator, "#missing");
            assert_eq!(info.calling_method, "Find::element");
        }

        #[test]
        fn test_same_origin_ignores_caller() {
            let a = CallingInformation::new("#a", LocatorStrategy::Css, "first");
            let b = CallingInformation::new("#a", LocatorStrategy::Css, "second");
            let c = CallingInformation::new("#a", LocatorStrategy::Id, "first");
            assert!(a.same_origin(&b));
            assert!(!a.same_origin(&c));
        }
    }

    mod geometry_tests {
        use super::*;

        #[test]
        fn test_rect_contains() {
            let rect = Rect::new(Point::new(10, 10), Size::new(20, 5));
            assert!(rect.contains(Point::new(10, 10)));
            assert!(rect.contains(Point::new(29, 14)));
            assert!(!rect.contains(Point::new(30, 10)));
            assert!(!rect.contains(Point::new(9, 12)));
        }

        #[test]
        fn test_size_empty() {
            assert!(Size::default().is_empty());
            assert!(!Size::new(1, 1).is_empty());
        }
    }

    mod classes_selector_tests {
        use super::*;

        #[test]
        fn test_single_class() {
            assert_eq!(classes_selector("primary"), ".primary");
        }

        #[test]
        fn test_multiple_classes() {
            assert_eq!(classes_selector("btn primary large"), ".btn.primary.large");
        }

        #[test]
        fn test_extra_whitespace() {
            assert_eq!(classes_selector("  btn   primary "), ".btn.primary");
        }

        #[test]
        fn test_empty() {
            assert_eq!(classes_selector("   "), "");
        }
    }
}
