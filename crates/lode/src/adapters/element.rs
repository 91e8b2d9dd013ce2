// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML element presented as a map.
//!
//! Keys encode three kinds of query:
//!
//! | Key       | Value                                              |
//! |-----------|----------------------------------------------------|
//! | `:`       | namespace URI (namespace-aware mode only)          |
//! | `@name`   | attribute value                                    |
//! | `name*`   | every matching descendant, as a list of elements   |
//! | `name`    | first matching descendant in document order        |
//!
//! Without namespace awareness, names match the qualified name as written
//! (`dc:title`). With it, names match the local name in any namespace.

use crate::value::{Elements, ListView, MapView, Value};
use crate::{Error, Result};
use std::sync::Arc;

const NAMESPACE_KEY: &str = ":";
const ATTRIBUTE_PREFIX: char = '@';
const LIST_SUFFIX: char = '*';

#[derive(Debug)]
struct Attribute {
    qualified: String,
    local: String,
    value: String,
}

#[derive(Debug)]
enum Content {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug)]
struct Node {
    qualified: String,
    local: String,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    content: Vec<Content>,
}

/// Read-only, shareable XML element tree.
#[derive(Debug, Clone)]
pub struct XmlElement(Arc<Node>);

impl XmlElement {
    /// Parses `text` and returns its root element.
    pub fn parse(text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text).map_err(|e| {
            let pos = e.pos();
            Error::parse(offset_of(text, pos.row, pos.col), e.to_string())
        })?;
        Ok(Self::build(doc.root_element()))
    }

    fn build(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let namespace = tag.namespace().map(str::to_string);
        let qualified = qualify(&node, tag.namespace(), tag.name());

        let attributes = node
            .attributes()
            .map(|attr| Attribute {
                qualified: qualify(&node, attr.namespace(), attr.name()),
                local: attr.name().to_string(),
                value: attr.value().to_string(),
            })
            .collect();

        let content = node
            .children()
            .filter_map(|child| {
                if child.is_element() {
                    Some(Content::Element(Self::build(child)))
                } else if child.is_text() {
                    child.text().map(|t| Content::Text(t.to_string()))
                } else {
                    None
                }
            })
            .collect();

        Self(Arc::new(Node {
            qualified,
            local: tag.name().to_string(),
            namespace,
            attributes,
            content,
        }))
    }

    /// Qualified name as written, e.g. `dc:title`.
    pub fn name(&self) -> &str {
        &self.0.qualified
    }

    pub fn local_name(&self) -> &str {
        &self.0.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.namespace.as_deref()
    }

    /// Attribute by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.0
            .attributes
            .iter()
            .find(|a| a.qualified == name)
            .map(|a| a.value.as_str())
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.0.content.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for content in &self.0.content {
            match content {
                Content::Text(t) => out.push_str(t),
                Content::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Descendants (excluding `self`) in document order.
    fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let mut stack: Vec<&XmlElement> = self.children().collect();
        stack.reverse();
        while let Some(element) = stack.pop() {
            out.push(element);
            let mark = stack.len();
            stack.extend(element.children());
            stack[mark..].reverse();
        }
        out
    }
}

fn qualify(node: &roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

/// Byte offset of a 1-based row/column position.
fn offset_of(text: &str, row: u32, col: u32) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(row.saturating_sub(1) as usize)
        .map(str::len)
        .sum();
    let column = text[line_start..]
        .char_indices()
        .nth(col.saturating_sub(1) as usize)
        .map_or(text.len() - line_start, |(i, _)| i);
    line_start + column
}

/// Map view over an [`XmlElement`].
#[derive(Debug, Clone)]
pub struct ElementAdapter {
    element: XmlElement,
    namespace_aware: bool,
}

impl ElementAdapter {
    pub fn new(element: XmlElement) -> Self {
        Self {
            element,
            namespace_aware: false,
        }
    }

    pub fn namespace_aware(element: XmlElement) -> Self {
        Self {
            element,
            namespace_aware: true,
        }
    }

    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    pub fn is_namespace_aware(&self) -> bool {
        self.namespace_aware
    }

    /// Text content of the element.
    pub fn text(&self) -> String {
        self.element.text()
    }

    pub fn into_value(self) -> Value {
        Value::MapView(Arc::new(self))
    }

    fn matches(&self, element: &XmlElement, name: &str) -> bool {
        if name == "*" {
            return true;
        }
        if self.namespace_aware {
            element.local_name() == name
        } else {
            element.name() == name
        }
    }

    fn find_attribute(&self, name: &str) -> Option<&str> {
        let attrs = &self.element.0.attributes;
        if self.namespace_aware {
            attrs.iter().find(|a| a.local == name).map(|a| a.value.as_str())
        } else {
            self.element.attribute(name)
        }
    }

    fn wrap(&self, element: &XmlElement) -> Self {
        Self {
            element: element.clone(),
            namespace_aware: self.namespace_aware,
        }
    }
}

impl MapView for ElementAdapter {
    /// Attribute keys, `@name`.
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .element
            .0
            .attributes
            .iter()
            .map(|a| format!("{}{}", ATTRIBUTE_PREFIX, a.qualified))
            .collect())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        if key == NAMESPACE_KEY {
            if !self.namespace_aware {
                return Ok(None);
            }
            return Ok(Some(
                self.element
                    .namespace()
                    .map_or(Value::Null, Value::from),
            ));
        }
        if let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            return Ok(self.find_attribute(name).map(Value::from));
        }
        if let Some(name) = key.strip_suffix(LIST_SUFFIX) {
            let items = self
                .element
                .descendants()
                .into_iter()
                .filter(|e| self.matches(e, name))
                .map(|e| self.wrap(e))
                .collect();
            return Ok(Some(Value::ListView(Arc::new(ElementList { items }))));
        }
        Ok(self
            .element
            .descendants()
            .into_iter()
            .find(|e| self.matches(e, key))
            .map(|e| self.wrap(e).into_value()))
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        if key == NAMESPACE_KEY {
            return Ok(self.namespace_aware);
        }
        if let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            return Ok(self.find_attribute(name).is_some());
        }
        if key.ends_with(LIST_SUFFIX) {
            return Ok(true);
        }
        Ok(self
            .element
            .descendants()
            .into_iter()
            .any(|e| self.matches(e, key)))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.element.0.attributes.len())
    }
}

/// Matching descendants; random access is supported.
struct ElementList {
    items: Vec<ElementAdapter>,
}

impl ListView for ElementList {
    fn len(&self) -> Result<usize> {
        Ok(self.items.len())
    }

    fn get(&self, index: usize) -> Result<Value> {
        self.items
            .get(index)
            .map(|e| e.clone().into_value())
            .ok_or(Error::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
    }

    fn elements(&self) -> Result<Elements<'_>> {
        Ok(Box::new(
            self.items.iter().map(|e| Ok(e.clone().into_value())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/" version="1">
  <title>News</title>
  <entry id="a"><dc:title>First</dc:title></entry>
  <entry id="b"><dc:title>Second</dc:title><note>n</note></entry>
</feed>"#;

    #[test]
    fn test_descendants_in_document_order() {
        let root = XmlElement::parse(DOC).expect("parse");
        let names: Vec<_> = root.descendants().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["title", "entry", "dc:title", "entry", "dc:title", "note"]
        );
        assert_eq!(root.namespace(), Some("http://www.w3.org/2005/Atom"));
    }

    #[test]
    fn test_text_content_concatenates() {
        let root = XmlElement::parse("<a>x<b>y</b>z</a>").expect("parse");
        assert_eq!(root.text(), "xyz");
    }

    #[test]
    fn test_parse_error_carries_offset() {
        let err = XmlElement::parse("<a>\n<b></a>").expect_err("mismatched");
        match err {
            Error::Parse { offset, .. } => assert!(offset > 0 && offset <= 11),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_offset_of_rows_and_columns() {
        assert_eq!(offset_of("ab\ncd", 1, 1), 0);
        assert_eq!(offset_of("ab\ncd", 2, 2), 4);
        assert_eq!(offset_of("ab", 1, 9), 2);
    }
}
