//! Locator resolution.
//!
//! [`Find`] turns a loosely specified locator string into elements by trying
//! the strategies of [`CASCADE_ORDER`] in turn:
//!
//! ```text
//! "locator" ──► Css ──► Id ──► Class* ──► Text ──► PartialText
//!                │       │       │          │          │
//!                └───────┴───────┴──────────┴──────────┴──► first non-empty wins
//!
//! * skipped when the locator contains whitespace
//! ```
//!
//! Results are never merged across strategies, and each element records the
//! strategy that matched in [`CallingInformation::strategy`]. A locator that
//! matches nothing yields an empty `Vec` or [`Element::NotFound`]; only
//! collaborator faults are returned as errors.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::driver::{BrowserDriver, SearchContext};
use crate::element::Element;
use crate::locator::{classes_selector, CallingInformation, LocatorStrategy, CASCADE_ORDER};
use crate::result::{BromineError, BromineResult};

/// Run the cascade against `scope`.
///
/// Returns the strategy that matched together with its elements, or
/// `Undefined` and an empty `Vec` when nothing matched.
pub(crate) fn cascade<C: SearchContext + ?Sized>(
    scope: &C,
    locator: &str,
    calling_method: &str,
) -> BromineResult<(LocatorStrategy, Vec<Element>)> {
    if locator.trim().is_empty() {
        warn!("Empty locator string, nothing to resolve");
        return Ok((LocatorStrategy::Undefined, Vec::new()));
    }

    for strategy in CASCADE_ORDER {
        if !strategy.applies_to(locator) {
            debug!(%strategy, locator, "Strategy skipped");
            continue;
        }
        let handles = match scope.find_native(strategy, locator) {
            Ok(handles) => handles,
            Err(BromineError::InvalidSelector { message, .. }) => {
                debug!(%strategy, locator, %message, "Locator rejected by strategy");
                continue;
            }
            Err(e) => return Err(e),
        };
        if handles.is_empty() {
            debug!(%strategy, locator, "Strategy returned no elements");
            continue;
        }
        debug!(%strategy, locator, count = handles.len(), "Resolved locator");
        let elements = handles
            .into_iter()
            .map(|handle| {
                Element::found(
                    handle,
                    CallingInformation::new(locator, strategy, calling_method),
                )
            })
            .collect();
        return Ok((strategy, elements));
    }

    warn!(locator, "Unable to find any element for the requested locator");
    Ok((LocatorStrategy::Undefined, Vec::new()))
}

/// Query `scope` with exactly one strategy.
///
/// `Undefined`, empty locators and locators the driver rejects all count as
/// "nothing matched".
pub(crate) fn lookup<C: SearchContext + ?Sized>(
    scope: &C,
    strategy: LocatorStrategy,
    locator: &str,
    calling_method: &str,
) -> BromineResult<Vec<Element>> {
    if strategy.is_undefined() || locator.trim().is_empty() {
        warn!(%strategy, locator, "Unable to find an element without a strategy and locator");
        return Ok(Vec::new());
    }
    let handles = match scope.find_native(strategy, locator) {
        Ok(handles) => handles,
        Err(BromineError::InvalidSelector { message, .. }) => {
            warn!(%strategy, locator, %message, "Locator rejected by strategy");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };
    if handles.is_empty() {
        warn!(%strategy, locator, "Unable to find any element for the requested locator");
    }
    Ok(handles
        .into_iter()
        .map(|handle| {
            Element::found(
                handle,
                CallingInformation::new(locator, strategy, calling_method),
            )
        })
        .collect())
}

/// Element finder for one browser session
#[derive(Debug, Clone)]
pub struct Find {
    driver: Arc<dyn BrowserDriver>,
    caller: Option<Arc<str>>,
}

impl Find {
    /// Create a finder over a driver
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self {
            driver,
            caller: None,
        }
    }

    /// A finder that stamps `label` as the calling method of every element
    #[must_use]
    pub fn with_caller(&self, label: impl Into<String>) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            caller: Some(Arc::from(label.into())),
        }
    }

    fn label<'a>(&'a self, operation: &'a str) -> &'a str {
        self.caller.as_deref().unwrap_or(operation)
    }

    /// First element matched by the cascade, or `NotFound`
    pub fn element(&self, locator: &str) -> BromineResult<Element> {
        let label = self.label("Find::element");
        let (_, elements) = cascade(self.driver.as_ref(), locator, label)?;
        Ok(first_or_not_found(elements, locator, label))
    }

    /// Every element matched by the first successful strategy
    pub fn elements(&self, locator: &str) -> BromineResult<Vec<Element>> {
        let (_, elements) = cascade(
            self.driver.as_ref(),
            locator,
            self.label("Find::elements"),
        )?;
        Ok(elements)
    }

    /// First element carrying every class in the space-separated `classes`
    pub fn element_by_classes(&self, classes: &str) -> BromineResult<Element> {
        self.element(&classes_selector(classes))
    }

    /// Every element carrying every class in the space-separated `classes`
    pub fn elements_by_classes(&self, classes: &str) -> BromineResult<Vec<Element>> {
        self.elements(&classes_selector(classes))
    }

    /// First element matched by a descendant CSS chain such as `"#nav .item a"`
    pub fn element_by_descendent_css(&self, selectors: &str) -> BromineResult<Element> {
        self.element(selectors)
    }

    /// Every element matched by a descendant CSS chain
    pub fn elements_by_descendent_css(&self, selectors: &str) -> BromineResult<Vec<Element>> {
        self.elements(selectors)
    }

    /// Resolve `parent_locator`, then `child_locator` inside the first parent match
    pub fn child_element(&self, parent_locator: &str, child_locator: &str) -> BromineResult<Element> {
        let parent = self.element(parent_locator)?;
        self.child_element_of(&parent, child_locator)
    }

    /// Resolve `parent_locator`, then every `child_locator` match inside it
    pub fn child_elements(
        &self,
        parent_locator: &str,
        child_locator: &str,
    ) -> BromineResult<Vec<Element>> {
        let parent = self.element(parent_locator)?;
        self.child_elements_of(&parent, child_locator)
    }

    /// First cascade match for `child_locator` among the descendants of `parent`
    pub fn child_element_of(&self, parent: &Element, child_locator: &str) -> BromineResult<Element> {
        let label = self.label("Find::child_element");
        let elements = self.scoped(parent, child_locator, label)?;
        Ok(first_or_not_found(elements, child_locator, label))
    }

    /// Every cascade match for `child_locator` among the descendants of `parent`
    pub fn child_elements_of(
        &self,
        parent: &Element,
        child_locator: &str,
    ) -> BromineResult<Vec<Element>> {
        self.scoped(parent, child_locator, self.label("Find::child_elements"))
    }

    fn scoped(
        &self,
        parent: &Element,
        child_locator: &str,
        label: &str,
    ) -> BromineResult<Vec<Element>> {
        match parent.handle() {
            Some(handle) => Ok(cascade(handle.as_ref(), child_locator, label)?.1),
            None => {
                debug!(
                    parent = %parent.info().locator,
                    child = child_locator,
                    "Parent element was not found, skipping child lookup"
                );
                Ok(Vec::new())
            }
        }
    }

    /// First element matched by exactly one strategy
    pub fn element_by(&self, strategy: LocatorStrategy, locator: &str) -> BromineResult<Element> {
        let label = self.label("Find::element_by");
        let elements = lookup(self.driver.as_ref(), strategy, locator, label)?;
        Ok(first_or_not_found(elements, locator, label))
    }

    /// Every element matched by exactly one strategy
    pub fn elements_by(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> BromineResult<Vec<Element>> {
        lookup(
            self.driver.as_ref(),
            strategy,
            locator,
            self.label("Find::elements_by"),
        )
    }
}

fn first_or_not_found(elements: Vec<Element>, locator: &str, label: &str) -> Element {
    elements
        .into_iter()
        .next()
        .unwrap_or_else(|| Element::not_found(locator, label))
}
