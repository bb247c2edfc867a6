use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

static ATTRIBUTE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_:][A-Za-z0-9_.:-]*$").unwrap());

/// Position in document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<(f64, f64)> for Size {
    fn from((width, height): (f64, f64)) -> Self {
        Self { width, height }
    }
}

/// Scene files may spell attribute values as numbers or booleans.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AttributeValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl AttributeValue {
    fn into_text(self) -> String {
        match self {
            AttributeValue::Text(text) => text,
            AttributeValue::Number(n) => ryu_js::Buffer::new().format(n).to_string(),
            AttributeValue::Flag(flag) => flag.to_string(),
        }
    }
}

/// Ordered attribute map. Insertion order is the order names appear in markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, AttributeValue>::deserialize(deserializer)?;
        Ok(Self {
            entries: raw.into_iter().map(|(k, v)| (k, v.into_text())).collect(),
        })
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces `name`. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `defaults` overlaid with `self`; entries of `self` win.
    pub fn merged_under(&self, defaults: &Attributes) -> Attributes {
        let mut merged = defaults.clone();
        for (name, value) in &self.entries {
            merged.entries.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Checks every name is usable as an XML attribute or CSS property name.
    pub fn validate(&self) -> Result<(), String> {
        for name in self.entries.keys() {
            if !ATTRIBUTE_NAME_RE.is_match(name) {
                return Err(format!("invalid attribute name {name:?}"));
            }
        }
        Ok(())
    }

    /// Like [`Attributes::validate`], and also rejects values that would end or open a CSS
    /// declaration block when written as `name:value`.
    pub fn validate_style(&self) -> Result<(), String> {
        self.validate()?;
        for (name, value) in &self.entries {
            if value.contains([';', '{', '}']) || value.trim_start().starts_with(':') {
                return Err(format!("invalid style value for {name:?}: {value:?}"));
            }
        }
        Ok(())
    }

    /// `name="value"` pairs joined by single spaces; empty map gives "".
    pub fn to_attribute_string(&self) -> String {
        let mut out = String::new();
        for (idx, (name, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
        out
    }

    /// CSS declarations (`name:value;name:value`) for a `style` attribute value.
    pub fn to_style_string(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{}:{}", name, escape_xml(value)))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_attributes_render_empty() {
        let attrs = Attributes::new();
        assert_eq!(attrs.to_attribute_string(), "");
        assert_eq!(attrs.to_style_string(), "");
    }

    #[test]
    fn attribute_string_keeps_insertion_order() {
        let attrs = Attributes::new()
            .with("stroke", "black")
            .with("fill", "red")
            .with("id", "a&b");
        assert_eq!(
            attrs.to_attribute_string(),
            "stroke=\"black\" fill=\"red\" id=\"a&amp;b\""
        );
        assert_eq!(attrs.to_style_string(), "stroke:black;fill:red;id:a&amp;b");
    }

    #[test]
    fn merge_prefers_own_entries() {
        let defaults = Attributes::new().with("fill", "white").with("stroke", "black");
        let own = Attributes::new().with("fill", "red");
        let merged = own.merged_under(&defaults);
        assert_eq!(merged.get("fill"), Some("red"));
        assert_eq!(merged.get("stroke"), Some("black"));
        assert_eq!(merged.to_style_string(), "fill:red;stroke:black");
    }

    #[test]
    fn rejects_bad_names() {
        assert!(Attributes::new().with("stroke-width", "2").validate().is_ok());
        assert!(Attributes::new().with("xlink:href", "#a").validate().is_ok());
        assert!(Attributes::new().with("", "x").validate().is_err());
        assert!(Attributes::new().with("bad name", "x").validate().is_err());
        assert!(Attributes::new().with("1st", "x").validate().is_err());
    }

    #[test]
    fn style_values_cannot_add_declarations() {
        let quoted = Attributes::new().with("font-family", "\"A&B\", serif");
        assert!(quoted.validate_style().is_ok());
        for value in ["red;stroke:blue", "red}", "{x", ": red"] {
            let err = Attributes::new().with("fill", value).validate_style().unwrap_err();
            assert!(err.contains("fill"), "{err}");
        }
        assert!(Attributes::new().with("bad name", "red").validate_style().is_err());
    }

    #[test]
    fn deserializes_mixed_values() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"fill":"red","stroke-width":2,"visible":true,"opacity":0.5}"#)
                .unwrap();
        assert_eq!(attrs.get("stroke-width"), Some("2"));
        assert_eq!(attrs.get("visible"), Some("true"));
        assert_eq!(attrs.get("opacity"), Some("0.5"));
        assert_eq!(attrs.iter().next(), Some(("fill", "red")));
    }
}
