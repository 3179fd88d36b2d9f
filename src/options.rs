//! Converter options and their serialization into `setOption` instructions.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Script variable holding the converter instance inside the generated document.
pub(crate) const CONVERTER_VAR: &str = "converter";

/// A single option value. Strings are quoted when serialized, everything else
/// is emitted as its literal form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Number(n) => write!(f, "{n}"),
            OptionValue::String(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Number(value.into())
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value.into())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

// ---------------------------------------------------------------------------
// Ordered option map
// ---------------------------------------------------------------------------

/// Insertion-ordered option map. Re-inserting a name replaces its value in place.
#[derive(Clone, Debug, Default)]
pub struct PanelOptions {
    entries: Vec<(String, OptionValue)>,
}

impl PanelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options every panel starts with: table support enabled.
    pub fn with_defaults() -> Self {
        let mut options = Self::new();
        options.insert("tables", true);
        options
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deep equality: same names with equal values, regardless of insertion order.
impl PartialEq for PanelOptions {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for PanelOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

impl Serialize for PanelOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PanelOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = PanelOptions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of option names to string, boolean or number values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PanelOptions, A::Error> {
                let mut options = PanelOptions::new();
                while let Some((name, value)) = access.next_entry::<String, OptionValue>()? {
                    options.insert(name, value);
                }
                Ok(options)
            }
        }

        deserializer.deserialize_map(OptionsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Serialization into converter instructions
// ---------------------------------------------------------------------------

/// One `setOption` call applied to the converter.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionInstruction {
    pub name: String,
    pub value: OptionValue,
}

impl fmt::Display for OptionInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CONVERTER_VAR}.setOption({}, {});",
            serde_json::Value::String(self.name.clone()),
            self.value
        )
    }
}

/// Emit one instruction per option, in insertion order.
pub fn serialize_options(options: &PanelOptions) -> Vec<OptionInstruction> {
    options
        .iter()
        .map(|(name, value)| OptionInstruction {
            name: name.to_string(),
            value: value.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_tables() {
        let options = PanelOptions::with_defaults();
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("tables"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn instructions_follow_insertion_order() {
        let mut options = PanelOptions::new();
        options.insert("zeta", "x");
        options.insert("alpha", 3);
        options.insert("mid", false);

        let rendered: Vec<String> = serialize_options(&options)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                r#"converter.setOption("zeta", "x");"#,
                r#"converter.setOption("alpha", 3);"#,
                r#"converter.setOption("mid", false);"#,
            ]
        );
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut options = PanelOptions::new();
        options.insert("a", 1);
        options.insert("b", 2);
        options.insert("a", 9);

        let names: Vec<&str> = options.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(options.get("a"), Some(&OptionValue::from(9)));
    }

    #[test]
    fn equality_ignores_order() {
        let a: PanelOptions = [("x", 1), ("y", 2)].into_iter().collect();
        let b: PanelOptions = [("y", 2), ("x", 1)].into_iter().collect();
        let c: PanelOptions = [("y", 2), ("x", 5)].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn float_values_render_as_literals() {
        let options: PanelOptions = serde_json::from_str(r#"{"ratio": 1.5}"#).unwrap();
        let rendered = serialize_options(&options)[0].to_string();
        assert_eq!(rendered, r#"converter.setOption("ratio", 1.5);"#);
    }

    #[test]
    fn string_values_are_quoted_with_escapes() {
        let mut options = PanelOptions::new();
        options.insert("prefix", r#"say "hi""#);
        let rendered = serialize_options(&options)[0].to_string();
        assert_eq!(rendered, r#"converter.setOption("prefix", "say \"hi\"");"#);
    }

    #[test]
    fn deserialize_preserves_document_order() {
        let options: PanelOptions =
            serde_json::from_str(r#"{"strikethrough": true, "tables": false, "headerLevelStart": 2}"#)
                .unwrap();
        let names: Vec<&str> = options.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["strikethrough", "tables", "headerLevelStart"]);
    }
}
