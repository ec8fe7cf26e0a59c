//! YAML front matter assembled from page properties and labels.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::util::sanitize_key;

static ROOT_LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^( *)(- )").unwrap());

/// Front-matter property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Property collection rendered as a `---` delimited YAML block.
///
/// Keys are emitted in sorted order.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    properties: BTreeMap<String, PropertyValue>,
    indent: usize,
}

impl FrontMatter {
    pub fn new(indent: usize) -> Self {
        Self {
            properties: BTreeMap::new(),
            indent,
        }
    }

    /// Set one property. Empty values are ignored; later values win.
    pub fn set_property(&mut self, key: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.properties.insert(sanitize_key(key), value);
    }

    pub fn set_properties<K, V>(&mut self, properties: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: Into<PropertyValue>,
    {
        for (key, value) in properties {
            self.set_property(key.as_ref(), value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Render as `---\n{yaml}\n---\n`, or `""` when no property is set.
    pub fn render(&self) -> String {
        if self.properties.is_empty() {
            return String::new();
        }

        let yaml = match serde_yaml::to_string(&self.properties) {
            Ok(yaml) => yaml,
            Err(e) => {
                warn!("Could not serialize front matter: {}", e);
                return String::new();
            }
        };

        let padding = " ".repeat(self.indent);
        let yaml = ROOT_LIST_ITEM.replace_all(yaml.trim(), format!("${{1}}{padding}${{2}}"));
        format!("---\n{yaml}\n---\n")
    }
}
