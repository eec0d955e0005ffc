//! Values substituted into a template
//!
//! A [`RenderContext`] maps placeholder names to one of three value shapes:
//! plain text, a rich-text block (one run per line), or a list of records
//! iterated by a `for` loop.

use indexmap::IndexMap;
use std::fmt;

/// Multi-line block rendered as separate runs joined by line breaks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    lines: Vec<String>,
}

impl RichText {
    /// Block from text, split on newlines, trailing whitespace trimmed
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.trim_end().split('\n').map(str::to_string).collect(),
        }
    }

    /// Block from individual lines
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Lines of the block
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Block as newline-joined text
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// One element of a list placeholder, fields addressed as `item.field`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordValue {
    fields: IndexMap<String, String>,
}

impl RecordValue {
    /// Empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a field
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Field value
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// Plain text for `{{ NAME }}`
    Text(String),
    /// Rich block for `{{r NAME }}`
    Rich(RichText),
    /// Records for `{% for item in NAME %}`
    List(Vec<RecordValue>),
}

impl TemplateValue {
    /// Shape name used in error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Rich(_) => "rich text",
            Self::List(_) => "list",
        }
    }

    /// Text content of scalar values
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Rich(rich) => Some(rich.text()),
            Self::List(_) => None,
        }
    }
}

impl From<String> for TemplateValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for TemplateValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<RichText> for TemplateValue {
    fn from(rich: RichText) -> Self {
        Self::Rich(rich)
    }
}

impl From<Vec<RecordValue>> for TemplateValue {
    fn from(items: Vec<RecordValue>) -> Self {
        Self::List(items)
    }
}

/// Placeholder name → value map handed to the renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: IndexMap<String, TemplateValue>,
}

impl RenderContext {
    /// Empty context
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a placeholder, replacing an earlier binding
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TemplateValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// With a binding
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of a placeholder
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.values.get(name)
    }

    /// Whether a placeholder is bound
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bindings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context has no bindings
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rich_text_splits_and_trims() {
        let rich = RichText::new("1. a\n2. b\n");
        assert_eq!(rich.lines(), ["1. a", "2. b"]);
        assert_eq!(rich.to_string(), "1. a\n2. b");
    }

    #[test]
    fn context_bindings() {
        let ctx = RenderContext::new()
            .with("OBJECT", "School")
            .with("FIRE", RichText::new("1. x"))
            .with("dsns_list", vec![RecordValue::new().with("pos", "Inspector")]);

        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.get("OBJECT").and_then(TemplateValue::as_text).as_deref(), Some("School"));
        assert_eq!(ctx.get("FIRE").map(TemplateValue::kind), Some("rich text"));
        assert!(ctx.get("dsns_list").and_then(TemplateValue::as_text).is_none());
        assert!(!ctx.contains("MISSING"));
    }
}
