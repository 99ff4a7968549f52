//! Named parameters passed into a fill.

use crate::xml::XmlDocument;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::Arc;

/// Reserved parameter key under which an XML data document is handed to the engine.
pub const XML_DATA_DOCUMENT: &str = "XML_DATA_DOCUMENT";

/// A parameter value: either a plain JSON scalar/structure or a shared XML document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Value),
    Document(Arc<XmlDocument>),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ParamValue::Scalar(v) => Some(v),
            ParamValue::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&Arc<XmlDocument>> {
        match self {
            ParamValue::Document(doc) => Some(doc),
            ParamValue::Scalar(_) => None,
        }
    }
}

impl From<Value> for ParamValue {
    fn from(v: Value) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Scalar(Value::String(s))
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Scalar(Value::from(n))
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Scalar(Value::from(n))
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Scalar(Value::Bool(b))
    }
}

impl From<Arc<XmlDocument>> for ParamValue {
    fn from(doc: Arc<XmlDocument>) -> Self {
        ParamValue::Document(doc)
    }
}

/// An ordered map from parameter name to value.
///
/// Ordering is by key so that anything derived from the map (expression
/// contexts, queries, dumps) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    entries: BTreeMap<String, ParamValue>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value under `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.entries.iter()
    }

    /// Returns the XML document stored under `key`, if that entry is a document.
    pub fn document(&self, key: &str) -> Option<&Arc<XmlDocument>> {
        self.get(key).and_then(ParamValue::as_document)
    }

    /// Collects the scalar entries into a JSON object. Document entries are skipped.
    pub fn scalars(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_scalar().map(|s| (k.clone(), s.clone())))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<Map<String, Value>> for ParameterMap {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl IntoIterator for ParameterMap {
    type Item = (String, ParamValue);
    type IntoIter = btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlElement;
    use serde_json::json;

    #[test]
    fn test_insert_returns_previous_value() {
        let mut params = ParameterMap::new();
        assert!(params.insert("title", "Q1").is_none());
        let previous = params.insert("title", "Q2");
        assert_eq!(previous, Some(ParamValue::from("Q1")));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_scalars_skip_documents() {
        let doc = Arc::new(XmlDocument::new(XmlElement::new("root")));
        let params = ParameterMap::new()
            .with("title", "Q1")
            .with("limit", 3i64)
            .with(XML_DATA_DOCUMENT, doc);

        let scalars = params.scalars();
        assert_eq!(scalars.len(), 2);
        assert_eq!(scalars["title"], json!("Q1"));
        assert!(params.document(XML_DATA_DOCUMENT).is_some());
        assert!(params.document("title").is_none());
    }

    #[test]
    fn test_from_json_map() {
        let map = json!({"name": "Alice", "age": 30});
        let params = ParameterMap::from(map.as_object().unwrap().clone());
        assert_eq!(params.get("name"), Some(&ParamValue::from("Alice")));
        assert_eq!(params.get("age"), Some(&ParamValue::Scalar(json!(30))));
    }
}
