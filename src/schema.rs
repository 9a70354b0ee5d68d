//! Declarative field schemas
//!
//! A schema is an ordered list of named fields. Each field says where to look
//! (a CSS selector, a label to search next to, or both) and what to take from
//! the elements found there.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to read from a located element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Text content, trimmed
    #[default]
    Text,
    /// Value of the named attribute
    Attribute(String),
    /// Text content plus the `href` attribute
    Link,
}

/// Find an element whose own text contains `label`, then use its following
/// siblings that match `sibling`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAdjacency {
    pub label: String,
    /// Restrict the label search to this tag name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_tag: Option<String>,
    /// CSS selector the sibling must match (e.g. `p`, `div.whitespace-pre-line`)
    pub sibling: String,
}

/// One field's locator, extraction mode and multiplicity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Primary lookup. May contain one `:contains('text')` pseudo-class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Fallback lookup, used when `selector` is unset or matches nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelAdjacency>,
    #[serde(default)]
    pub extract: ExtractMode,
    #[serde(default)]
    pub multiple: bool,
}

impl FieldSpec {
    pub fn css(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            label: None,
            extract: ExtractMode::Text,
            multiple: false,
        }
    }

    pub fn next_to(label: &str, sibling: &str) -> Self {
        Self {
            selector: None,
            label: Some(LabelAdjacency {
                label: label.to_string(),
                label_tag: None,
                sibling: sibling.to_string(),
            }),
            extract: ExtractMode::Text,
            multiple: false,
        }
    }

    /// Only accept label matches on elements with this tag
    pub fn label_tag(mut self, tag: &str) -> Self {
        if let Some(label) = self.label.as_mut() {
            label.label_tag = Some(tag.to_string());
        }
        self
    }

    pub fn attr(mut self, name: &str) -> Self {
        self.extract = ExtractMode::Attribute(name.to_string());
        self
    }

    pub fn links(mut self) -> Self {
        self.extract = ExtractMode::Link;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// Ordered mapping of field name to spec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
}

#[derive(Deserialize)]
struct SchemaFile {
    fields: Vec<NamedField>,
}

#[derive(Deserialize)]
struct NamedField {
    name: String,
    #[serde(flatten)]
    spec: FieldSpec,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        self.fields.push((name.to_string(), spec));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a YAML schema document:
    ///
    /// ```yaml
    /// fields:
    ///   - name: title
    ///     selector: h1
    ///   - name: salary
    ///     label: { label: 報酬, sibling: p }
    ///   - name: links
    ///     selector: a
    ///     extract: link
    ///     multiple: true
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: SchemaFile = serde_yaml::from_str(content)?;
        let mut schema = Schema::new();
        for NamedField { name, spec } in file.fields {
            if spec.selector.is_none() && spec.label.is_none() {
                return Err(ConfigError::InvalidField(name));
            }
            schema.fields.push((name, spec));
        }
        Ok(schema)
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::ReadSchema {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_yaml(&content)
    }
}
