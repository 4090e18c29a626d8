//! Simple selector matching for the mock DOM.
//!
//! Supports what tests written against the mock need: type and universal
//! selectors, `#id`, `.class`, `[attr]`, `[attr=value]`, the descendant and
//! child combinators, and comma-separated lists. Anything else is rejected
//! the way a browser rejects an invalid selector.

use super::dom::{MockDom, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, dom: &MockDom, node: NodeId) -> bool {
        let Some(n) = dom.node(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !n.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if n.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| n.classes.contains(c)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|(name, expected)| match (n.attribute(name), expected) {
                (Some(actual), Some(expected)) => actual == *expected,
                (Some(_), None) => true,
                (None, _) => false,
            })
    }
}

/// A parsed selector list
#[derive(Debug, Clone)]
pub(crate) struct SelectorList {
    chains: Vec<Vec<(Combinator, Compound)>>,
}

impl SelectorList {
    /// Parse a selector list, returning a message describing the first error
    pub(crate) fn parse(input: &str) -> Result<Self, String> {
        Parser::new(input).parse_list()
    }

    /// Whether `node` matches any selector in the list
    pub(crate) fn matches(&self, dom: &MockDom, node: NodeId) -> bool {
        self.chains
            .iter()
            .any(|chain| !chain.is_empty() && matches_from(dom, chain, chain.len() - 1, node))
    }
}

fn matches_from(
    dom: &MockDom,
    chain: &[(Combinator, Compound)],
    index: usize,
    node: NodeId,
) -> bool {
    let (combinator, compound) = &chain[index];
    if !compound.matches(dom, node) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match combinator {
        Combinator::Child => dom
            .parent(node)
            .is_some_and(|parent| matches_from(dom, chain, index - 1, parent)),
        Combinator::Descendant => {
            let mut current = dom.parent(node);
            while let Some(ancestor) = current {
                if matches_from(dom, chain, index - 1, ancestor) {
                    return true;
                }
                current = dom.parent(ancestor);
            }
            false
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> String {
        match self.peek() {
            Some(c) => format!("unexpected '{c}' at position {}", self.pos),
            None => "unexpected end of selector".to_string(),
        }
    }

    fn parse_list(mut self) -> Result<SelectorList, String> {
        let mut chains = Vec::new();
        loop {
            self.skip_whitespace();
            chains.push(self.parse_chain()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList { chains })
    }

    fn parse_chain(&mut self) -> Result<Vec<(Combinator, Compound)>, String> {
        let mut chain = vec![(Combinator::Descendant, self.parse_compound()?)];
        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            chain.push((combinator, self.parse_compound()?));
        }
        Ok(chain)
    }

    fn parse_compound(&mut self) -> Result<Compound, String> {
        let mut compound = Compound::default();
        let mut parsed_any = false;

        if self.peek() == Some('*') {
            self.pos += 1;
            parsed_any = true;
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            parsed_any = true;
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
            parsed_any = true;
        }

        if parsed_any {
            Ok(compound)
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_ident(&mut self) -> Result<String, String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> Result<(String, Option<String>), String> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();
        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.pos += 1;
                self.skip_whitespace();
                let value = self.parse_value()?;
                self.skip_whitespace();
                Some(value)
            }
            _ => return Err(self.unexpected()),
        };
        if self.peek() != Some(']') {
            return Err(self.unexpected());
        }
        self.pos += 1;
        Ok((name, value))
    }

    fn parse_value(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err("unterminated string in attribute selector".to_string());
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(value)
            }
            _ => self.parse_ident(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
