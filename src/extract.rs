//! Selector-schema extraction
//!
//! Applies a [`Schema`] to a document and returns a flat record of field name
//! to value. Fields whose locator finds nothing are left out of the record.

use crate::dom::{Dom, HtmlPage};
use crate::error::ExtractError;
use crate::schema::{ExtractMode, FieldSpec, LabelAdjacency, Schema};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static CONTAINS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":contains\(\s*(?:'([^']*)'|"([^"]*)")\s*\)"#).unwrap()
});

/// A link as found in the page. `text` may be empty (icon links); `href` may
/// be missing (named anchors).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Link(RawLink),
    Links(Vec<RawLink>),
}

/// Field name to extracted value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl ExtractedRecord {
    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Single text value, or the first entry of a list
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(items) => items.first().map(String::as_str),
            FieldValue::Link(_) | FieldValue::Links(_) => None,
        }
    }

    /// List value; a single text value is treated as a one-element list
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Link values; a single link is treated as a one-element list
    pub fn links(&self, name: &str) -> &[RawLink] {
        match self.fields.get(name) {
            Some(FieldValue::Link(link)) => std::slice::from_ref(link),
            Some(FieldValue::Links(links)) => links,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A primary selector, split around an optional `:contains('...')`
#[derive(Debug, PartialEq, Eq)]
enum Query<'q> {
    Css(&'q str),
    Contains {
        scope: &'q str,
        needle: &'q str,
        inner: Option<&'q str>,
    },
}

impl<'q> Query<'q> {
    fn parse(css: &'q str) -> Result<Self, ExtractError> {
        let Some(caps) = CONTAINS_RE.captures(css) else {
            return Ok(Query::Css(css));
        };
        let invalid = |reason: &str| ExtractError::InvalidSelector {
            selector: css.to_string(),
            reason: reason.to_string(),
        };

        let whole = caps.get(0).ok_or_else(|| invalid("unreadable :contains"))?;
        let needle = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .ok_or_else(|| invalid("unreadable :contains"))?;

        let scope = css[..whole.start()].trim();
        let rest = &css[whole.end()..];
        if CONTAINS_RE.is_match(rest) {
            return Err(invalid("only one :contains is supported"));
        }
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Err(invalid("expected a descendant selector after :contains"));
        }

        let inner = Some(rest.trim()).filter(|s| !s.is_empty());
        Ok(Query::Contains {
            scope: if scope.is_empty() { "*" } else { scope },
            needle,
            inner,
        })
    }
}

fn select_query<'a, D: Dom>(dom: &'a D, css: &str) -> Result<Vec<D::Node<'a>>, ExtractError> {
    match Query::parse(css)? {
        Query::Css(css) => dom.select(css),
        Query::Contains {
            scope,
            needle,
            inner,
        } => {
            let scopes: Vec<_> = dom
                .select(scope)?
                .into_iter()
                .filter(|&node| dom.text(node).contains(needle))
                .collect();
            let Some(inner) = inner else {
                return Ok(scopes);
            };

            let mut found = Vec::new();
            for scope in scopes {
                for node in dom.select_within(scope, inner)? {
                    if !found.contains(&node) {
                        found.push(node);
                    }
                }
            }
            Ok(found)
        }
    }
}

fn label_adjacent<'a, D: Dom>(
    dom: &'a D,
    adjacency: &LabelAdjacency,
) -> Result<Vec<D::Node<'a>>, ExtractError> {
    match dom.find_label(&adjacency.label, adjacency.label_tag.as_deref()) {
        Some(label) => dom.next_siblings(label, &adjacency.sibling),
        None => Ok(Vec::new()),
    }
}

/// Primary selector first; the label fallback only when that finds nothing
fn locate<'a, D: Dom>(dom: &'a D, spec: &FieldSpec) -> Result<Vec<D::Node<'a>>, ExtractError> {
    if let Some(selector) = &spec.selector {
        let found = select_query(dom, selector)?;
        if !found.is_empty() {
            return Ok(found);
        }
    }
    match &spec.label {
        Some(adjacency) => label_adjacent(dom, adjacency),
        None => Ok(Vec::new()),
    }
}

fn read_string<'a, D: Dom>(dom: &'a D, node: D::Node<'a>, mode: &ExtractMode) -> Option<String> {
    match mode {
        ExtractMode::Text | ExtractMode::Link => Some(dom.text(node).trim().to_string()),
        ExtractMode::Attribute(name) => dom.attr(node, name),
    }
}

fn read_link<'a, D: Dom>(dom: &'a D, node: D::Node<'a>) -> RawLink {
    RawLink {
        text: dom.text(node).trim().to_string(),
        href: dom.attr(node, "href"),
    }
}

/// Apply `schema` to `dom`
pub fn extract<D: Dom>(dom: &D, schema: &Schema) -> Result<ExtractedRecord, ExtractError> {
    let mut record = ExtractedRecord::default();

    for (name, spec) in schema.fields() {
        let nodes = locate(dom, spec)?;
        if nodes.is_empty() {
            continue;
        }

        let value = match (&spec.extract, spec.multiple) {
            (ExtractMode::Link, true) => Some(FieldValue::Links(
                nodes.into_iter().map(|node| read_link(dom, node)).collect(),
            )),
            (ExtractMode::Link, false) => Some(FieldValue::Link(read_link(dom, nodes[0]))),
            (mode, true) => Some(FieldValue::List(
                nodes
                    .into_iter()
                    .filter_map(|node| read_string(dom, node, mode))
                    .filter(|value| !value.trim().is_empty())
                    .collect(),
            )),
            (mode, false) => read_string(dom, nodes[0], mode).map(FieldValue::Text),
        };

        if let Some(value) = value {
            record.insert(name, value);
        }
    }

    Ok(record)
}

/// Parse `html` and apply `schema`
pub fn extract_html(html: &str, schema: &Schema) -> Result<ExtractedRecord, ExtractError> {
    extract(&HtmlPage::parse(html), schema)
}
