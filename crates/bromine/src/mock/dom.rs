//! In-memory DOM and the driver that serves it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::selector::SelectorList;
use crate::driver::{BrowserDriver, NativeElement, NativeHandle, SearchContext};
use crate::locator::{LocatorStrategy, Point, Size, PARENT_XPATH};
use crate::result::{BromineError, BromineResult};

/// Index of a node in the mock DOM
pub type NodeId = usize;

/// Description of one mock element
#[derive(Debug, Clone)]
pub struct MockNode {
    pub(crate) tag: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    text: String,
    attributes: BTreeMap<String, String>,
    properties: BTreeMap<String, String>,
    css: BTreeMap<String, String>,
    enabled: bool,
    selected: bool,
    displayed: bool,
    location: Point,
    size: Size,
}

impl MockNode {
    /// Create a node with the given tag name
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            text: String::new(),
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            css: BTreeMap::new(),
            enabled: true,
            selected: false,
            displayed: true,
            location: Point::default(),
            size: Size::new(100, 20),
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the class list from a space-separated string
    #[must_use]
    pub fn class(mut self, classes: &str) -> Self {
        self.classes = classes.split_whitespace().map(str::to_string).collect();
        self
    }

    /// Set the node's own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a DOM property
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Set a computed CSS value
    #[must_use]
    pub fn css(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(name.into(), value.into());
        self
    }

    /// Set the enabled state
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the selected state
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set the displayed state
    #[must_use]
    pub const fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    /// Set location and size
    #[must_use]
    pub const fn bounds(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        self.location = Point::new(x, y);
        self.size = Size::new(width, height);
        self
    }

    /// Attribute lookup, with `id` and `class` reflected from their fields
    pub(crate) fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            _ => self.attributes.get(name).cloned(),
        }
    }
}

#[derive(Debug)]
struct Slot {
    node: MockNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
    clicks: usize,
    submits: usize,
}

/// Tree of mock nodes rooted at an `<html>` element
#[derive(Debug)]
pub struct MockDom {
    slots: Vec<Slot>,
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDom {
    /// The `<html>` root
    pub const ROOT: NodeId = 0;

    /// Create a DOM holding only the root element
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                node: MockNode::new("html"),
                parent: None,
                children: Vec::new(),
                attached: true,
                clicks: 0,
                submits: 0,
            }],
        }
    }

    /// Append `node` as the last child of `parent` (the root when `parent` is unknown)
    pub fn append(&mut self, parent: NodeId, node: MockNode) -> NodeId {
        let parent = if parent < self.slots.len() {
            parent
        } else {
            Self::ROOT
        };
        let id = self.slots.len();
        let attached = self.slots[parent].attached;
        self.slots.push(Slot {
            node,
            parent: Some(parent),
            children: Vec::new(),
            attached,
            clicks: 0,
            submits: 0,
        });
        self.slots[parent].children.push(id);
        id
    }

    /// Node description, if attached
    pub(crate) fn node(&self, id: NodeId) -> Option<&MockNode> {
        self.slots.get(id).filter(|s| s.attached).map(|s| &s.node)
    }

    /// Parent of an attached node
    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id).filter(|s| s.attached).and_then(|s| s.parent)
    }

    fn is_attached(&self, id: NodeId) -> bool {
        self.slots.get(id).is_some_and(|s| s.attached)
    }

    /// Detach a node and its subtree
    fn detach(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(slot) = self.slots.get_mut(current) {
                slot.attached = false;
                pending.extend(slot.children.iter().copied());
            }
        }
        if let Some(parent) = self.slots.get(id).and_then(|s| s.parent) {
            self.slots[parent].children.retain(|&c| c != id);
        }
    }

    /// Displayed, and every ancestor displayed too
    fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.slots.get(node) {
                Some(slot) if slot.attached && slot.node.displayed => current = slot.parent,
                _ => return false,
            }
        }
        true
    }

    /// Attached nodes under `scope` in document order, `scope` excluded.
    /// The document scope includes the root.
    fn descendants(&self, scope: Option<NodeId>) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = match scope {
            None => vec![Self::ROOT],
            Some(node) => self
                .slots
                .get(node)
                .map(|s| s.children.iter().rev().copied().collect())
                .unwrap_or_default(),
        };
        while let Some(node) = stack.pop() {
            let Some(slot) = self.slots.get(node).filter(|s| s.attached) else {
                continue;
            };
            order.push(node);
            stack.extend(slot.children.iter().rev().copied());
        }
        order
    }

    fn rendered_text(&self, id: NodeId) -> String {
        if !self.is_rendered(id) {
            return String::new();
        }
        let own = self.slots[id].node.text.trim();
        let mut parts: Vec<String> = Vec::new();
        if !own.is_empty() {
            parts.push(own.to_string());
        }
        for &child in &self.slots[id].children {
            let text = self.rendered_text(child);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join(" ")
    }

    fn find(
        &self,
        scope: Option<NodeId>,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> BromineResult<Vec<NodeId>> {
        let candidates = self.descendants(scope);
        let matched = match strategy {
            LocatorStrategy::Id => candidates
                .into_iter()
                .filter(|&n| self.slots[n].node.id.as_deref() == Some(locator))
                .collect(),
            LocatorStrategy::Class => {
                if locator.is_empty() || locator.chars().any(char::is_whitespace) {
                    return Err(BromineError::invalid_selector(
                        strategy,
                        locator,
                        "compound class names are not permitted",
                    ));
                }
                candidates
                    .into_iter()
                    .filter(|&n| self.slots[n].node.classes.iter().any(|c| c == locator))
                    .collect()
            }
            LocatorStrategy::Css => {
                let selector = SelectorList::parse(locator)
                    .map_err(|message| BromineError::invalid_selector(strategy, locator, message))?;
                candidates
                    .into_iter()
                    .filter(|&n| selector.matches(self, n))
                    .collect()
            }
            LocatorStrategy::Tag => candidates
                .into_iter()
                .filter(|&n| self.slots[n].node.tag.eq_ignore_ascii_case(locator))
                .collect(),
            LocatorStrategy::Text => candidates
                .into_iter()
                .filter(|&n| self.is_rendered(n) && self.slots[n].node.text.trim() == locator)
                .collect(),
            LocatorStrategy::PartialText => {
                if locator.is_empty() {
                    return Ok(Vec::new());
                }
                candidates
                    .into_iter()
                    .filter(|&n| self.is_rendered(n) && self.slots[n].node.text.contains(locator))
                    .collect()
            }
            LocatorStrategy::XPath if locator == PARENT_XPATH => {
                scope.and_then(|n| self.parent(n)).into_iter().collect()
            }
            LocatorStrategy::XPath => {
                return Err(BromineError::invalid_selector(
                    strategy,
                    locator,
                    "the mock driver only understands the parent axis",
                ))
            }
            LocatorStrategy::Undefined => {
                return Err(BromineError::invalid_selector(
                    strategy,
                    locator,
                    "no strategy given",
                ))
            }
        };
        Ok(matched)
    }
}

#[derive(Debug)]
struct MockState {
    dom: MockDom,
    closed: bool,
    implicit_wait: Option<Duration>,
    queries: Vec<String>,
}

type SharedState = Arc<Mutex<MockState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock driver for unit testing.
///
/// Clones share the same DOM, so a test can keep one clone for setup and
/// inspection while a [`crate::Session`] owns another.
#[derive(Debug, Clone)]
pub struct MockDriver {
    name: String,
    state: SharedState,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create a driver serving an empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            state: Arc::new(Mutex::new(MockState {
                dom: MockDom::new(),
                closed: false,
                implicit_wait: None,
                queries: Vec::new(),
            })),
        }
    }

    /// The `<html>` root
    #[must_use]
    pub const fn root(&self) -> NodeId {
        MockDom::ROOT
    }

    /// Append a node under `parent`
    pub fn append(&self, parent: NodeId, node: MockNode) -> NodeId {
        lock(&self.state).dom.append(parent, node)
    }

    /// Remove a node and its subtree; existing handles to them become stale
    pub fn remove(&self, node: NodeId) {
        lock(&self.state).dom.detach(node);
    }

    /// Change a node's displayed state
    pub fn set_displayed(&self, node: NodeId, displayed: bool) {
        if let Some(slot) = lock(&self.state).dom.slots.get_mut(node) {
            slot.node.displayed = displayed;
        }
    }

    /// Change a node's own text
    pub fn set_text(&self, node: NodeId, text: impl Into<String>) {
        if let Some(slot) = lock(&self.state).dom.slots.get_mut(node) {
            slot.node.text = text.into();
        }
    }

    /// Handle to a node, as a driver lookup would return it
    #[must_use]
    pub fn handle(&self, node: NodeId) -> NativeHandle {
        Arc::new(MockElement {
            state: Arc::clone(&self.state),
            node,
        })
    }

    /// Lookups issued so far, formatted as `Strategy:locator`
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        lock(&self.state).queries.clone()
    }

    /// Forget recorded lookups
    pub fn clear_queries(&self) {
        lock(&self.state).queries.clear();
    }

    /// Number of clicks delivered to a node
    #[must_use]
    pub fn clicks(&self, node: NodeId) -> usize {
        lock(&self.state).dom.slots.get(node).map_or(0, |s| s.clicks)
    }

    /// Number of submits delivered to a node
    #[must_use]
    pub fn submits(&self, node: NodeId) -> usize {
        lock(&self.state).dom.slots.get(node).map_or(0, |s| s.submits)
    }

    /// Current `value` property of a node
    #[must_use]
    pub fn value(&self, node: NodeId) -> String {
        lock(&self.state)
            .dom
            .slots
            .get(node)
            .and_then(|s| s.node.properties.get("value").cloned())
            .unwrap_or_default()
    }

    /// Implicit wait configured through [`BrowserDriver::set_implicit_wait`]
    #[must_use]
    pub fn implicit_wait(&self) -> Option<Duration> {
        lock(&self.state).implicit_wait
    }

    /// Whether [`BrowserDriver::quit`] has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    fn handles(&self, nodes: Vec<NodeId>) -> Vec<NativeHandle> {
        nodes.into_iter().map(|node| self.handle(node)).collect()
    }
}

fn query(
    state: &SharedState,
    scope: Option<NodeId>,
    strategy: LocatorStrategy,
    locator: &str,
) -> BromineResult<Vec<NodeId>> {
    let mut guard = lock(state);
    if guard.closed {
        return Err(BromineError::SessionClosed);
    }
    if let Some(node) = scope {
        if !guard.dom.is_attached(node) {
            return Err(stale(node));
        }
    }
    guard.queries.push(format!("{strategy}:{locator}"));
    guard.dom.find(scope, strategy, locator)
}

fn stale(node: NodeId) -> BromineError {
    BromineError::StaleElement {
        message: format!("node {node} is no longer attached to the document"),
    }
}

impl SearchContext for MockDriver {
    fn find_native(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> BromineResult<Vec<NativeHandle>> {
        let nodes = query(&self.state, None, strategy, locator)?;
        Ok(self.handles(nodes))
    }
}

impl BrowserDriver for MockDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_implicit_wait(&self, wait: Duration) -> BromineResult<()> {
        let mut guard = lock(&self.state);
        if guard.closed {
            return Err(BromineError::SessionClosed);
        }
        guard.implicit_wait = Some(wait);
        Ok(())
    }

    fn quit(&self) -> BromineResult<()> {
        lock(&self.state).closed = true;
        Ok(())
    }
}

/// Handle to a node of a [`MockDriver`]
#[derive(Debug)]
pub struct MockElement {
    state: SharedState,
    node: NodeId,
}

impl MockElement {
    fn read<T>(&self, f: impl FnOnce(&MockDom, NodeId) -> T) -> BromineResult<T> {
        let guard = lock(&self.state);
        if guard.closed {
            return Err(BromineError::SessionClosed);
        }
        if !guard.dom.is_attached(self.node) {
            return Err(stale(self.node));
        }
        Ok(f(&guard.dom, self.node))
    }

    fn write(&self, f: impl FnOnce(&mut Slot)) -> BromineResult<()> {
        let mut guard = lock(&self.state);
        if guard.closed {
            return Err(BromineError::SessionClosed);
        }
        match guard.dom.slots.get_mut(self.node) {
            Some(slot) if slot.attached => {
                f(slot);
                Ok(())
            }
            _ => Err(stale(self.node)),
        }
    }
}

impl SearchContext for MockElement {
    fn find_native(
        &self,
        strategy: LocatorStrategy,
        locator: &str,
    ) -> BromineResult<Vec<NativeHandle>> {
        let nodes = query(&self.state, Some(self.node), strategy, locator)?;
        Ok(nodes
            .into_iter()
            .map(|node| {
                Arc::new(Self {
                    state: Arc::clone(&self.state),
                    node,
                }) as NativeHandle
            })
            .collect())
    }
}

impl NativeElement for MockElement {
    fn tag_name(&self) -> BromineResult<String> {
        self.read(|dom, n| dom.slots[n].node.tag.clone())
    }

    fn text(&self) -> BromineResult<String> {
        self.read(MockDom::rendered_text)
    }

    fn is_enabled(&self) -> BromineResult<bool> {
        self.read(|dom, n| dom.slots[n].node.enabled)
    }

    fn is_selected(&self) -> BromineResult<bool> {
        self.read(|dom, n| dom.slots[n].node.selected)
    }

    fn is_displayed(&self) -> BromineResult<bool> {
        self.read(MockDom::is_rendered)
    }

    fn location(&self) -> BromineResult<Point> {
        self.read(|dom, n| dom.slots[n].node.location)
    }

    fn size(&self) -> BromineResult<Size> {
        self.read(|dom, n| dom.slots[n].node.size)
    }

    fn attribute(&self, name: &str) -> BromineResult<Option<String>> {
        self.read(|dom, n| dom.slots[n].node.attribute(name))
    }

    fn property(&self, name: &str) -> BromineResult<Option<String>> {
        self.read(|dom, n| dom.slots[n].node.properties.get(name).cloned())
    }

    fn css_value(&self, name: &str) -> BromineResult<String> {
        self.read(|dom, n| dom.slots[n].node.css.get(name).cloned().unwrap_or_default())
    }

    fn clear(&self) -> BromineResult<()> {
        self.write(|slot| {
            slot.node.properties.insert("value".to_string(), String::new());
        })
    }

    fn click(&self) -> BromineResult<()> {
        self.write(|slot| slot.clicks += 1)
    }

    fn send_keys(&self, text: &str) -> BromineResult<()> {
        self.write(|slot| {
            slot.node
                .properties
                .entry("value".to_string())
                .or_default()
                .push_str(text);
        })
    }

    fn submit(&self) -> BromineResult<()> {
        self.write(|slot| slot.submits += 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page() -> (MockDriver, NodeId, NodeId, NodeId) {
        let driver = MockDriver::new();
        let body = driver.append(driver.root(), MockNode::new("body"));
        let form = driver.append(body, MockNode::new("form").id("login"));
        let input = driver.append(
            form,
            MockNode::new("input").class("field").attr("name", "user"),
        );
        (driver, body, form, input)
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_document_order() {
            let driver = MockDriver::new();
            let a = driver.append(driver.root(), MockNode::new("div").text("a"));
            let b = driver.append(driver.root(), MockNode::new("div").text("b"));
            let nested = driver.append(a, MockNode::new("div").text("nested"));
            let found = driver.find_native(LocatorStrategy::Tag, "div").unwrap();
            let texts: Vec<String> = found.iter().map(|h| h.text().unwrap()).collect();
            assert_eq!(texts, vec!["a nested", "nested", "b"]);
            let _ = (b, nested);
        }

        #[test]
        fn test_class_rejects_compound() {
            let (driver, ..) = page();
            let err = driver
                .find_native(LocatorStrategy::Class, "field wide")
                .unwrap_err();
            assert!(matches!(err, BromineError::InvalidSelector { .. }));
        }

        #[test]
        fn test_scoped_lookup_excludes_scope() {
            let (driver, _, form, _) = page();
            let form_handle = driver.handle(form);
            assert!(form_handle
                .find_native(LocatorStrategy::Id, "login")
                .unwrap()
                .is_empty());
            assert_eq!(
                form_handle
                    .find_native(LocatorStrategy::Tag, "input")
                    .unwrap()
                    .len(),
                1
            );
        }

        #[test]
        fn test_parent_axis() {
            let (driver, _, _, input) = page();
            let parents = driver
                .handle(input)
                .find_native(LocatorStrategy::XPath, "..")
                .unwrap();
            assert_eq!(parents.len(), 1);
            assert_eq!(parents[0].tag_name().unwrap(), "form");
            assert!(driver
                .find_native(LocatorStrategy::XPath, "//div")
                .is_err());
        }

        #[test]
        fn test_hidden_text_not_matched() {
            let driver = MockDriver::new();
            driver.append(
                driver.root(),
                MockNode::new("span").text("Secret").displayed(false),
            );
            assert!(driver
                .find_native(LocatorStrategy::Text, "Secret")
                .unwrap()
                .is_empty());
        }

        #[test]
        fn test_queries_recorded() {
            let (driver, ..) = page();
            driver.find_native(LocatorStrategy::Id, "login").unwrap();
            assert_eq!(driver.queries(), vec!["Id:login".to_string()]);
            driver.clear_queries();
            assert!(driver.queries().is_empty());
        }
    }

    mod fault_tests {
        use super::*;

        #[test]
        fn test_removed_node_is_stale() {
            let (driver, _, form, input) = page();
            let handle = driver.handle(input);
            driver.remove(form);
            assert!(matches!(
                handle.tag_name().unwrap_err(),
                BromineError::StaleElement { .. }
            ));
            assert!(driver
                .find_native(LocatorStrategy::Tag, "input")
                .unwrap()
                .is_empty());
        }

        #[test]
        fn test_quit_closes_session() {
            let (driver, _, _, input) = page();
            driver.quit().unwrap();
            assert!(driver.is_closed());
            assert!(matches!(
                driver.find_native(LocatorStrategy::Tag, "input").unwrap_err(),
                BromineError::SessionClosed
            ));
            assert!(matches!(
                driver.handle(input).click().unwrap_err(),
                BromineError::SessionClosed
            ));
        }
    }

    mod interaction_tests {
        use super::*;

        #[test]
        fn test_send_keys_and_clear() {
            let (driver, _, _, input) = page();
            let handle = driver.handle(input);
            handle.send_keys("ada").unwrap();
            handle.send_keys("@example").unwrap();
            assert_eq!(driver.value(input), "ada@example");
            handle.clear().unwrap();
            assert_eq!(driver.value(input), "");
        }

        #[test]
        fn test_click_and_submit_counted() {
            let (driver, _, form, _) = page();
            let handle = driver.handle(form);
            handle.click().unwrap();
            handle.submit().unwrap();
            handle.submit().unwrap();
            assert_eq!(driver.clicks(form), 1);
            assert_eq!(driver.submits(form), 2);
        }

        #[test]
        fn test_attribute_reflection() {
            let (driver, _, form, input) = page();
            assert_eq!(
                driver.handle(form).attribute("id").unwrap(),
                Some("login".to_string())
            );
            assert_eq!(
                driver.handle(input).attribute("class").unwrap(),
                Some("field".to_string())
            );
            assert_eq!(driver.handle(input).attribute("missing").unwrap(), None);
        }

        #[test]
        fn test_displayed_inherits_from_ancestors() {
            let (driver, body, _, input) = page();
            assert!(driver.handle(input).is_displayed().unwrap());
            driver.set_displayed(body, false);
            assert!(!driver.handle(input).is_displayed().unwrap());
        }
    }
}
