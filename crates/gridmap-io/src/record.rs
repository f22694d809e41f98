//! Flat records: the input and output boundary of the engine.

use std::collections::{BTreeMap, HashMap};

use gridmap_core::Value;

/// One source row or document: lower-cased field name to raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    fields: BTreeMap<String, String>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field; the name is lower-cased.
    pub fn insert(&mut self, name: impl AsRef<str>, raw: impl Into<String>) {
        self.fields
            .insert(name.as_ref().to_lowercase(), raw.into());
    }

    pub fn with(mut self, name: impl AsRef<str>, raw: impl Into<String>) -> Self {
        self.insert(name, raw);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The fields among `names` that are present.
    pub fn subset(&self, names: &[&str]) -> FieldRecord {
        FieldRecord {
            fields: names
                .iter()
                .filter_map(|n| self.fields.get_key_value(*n))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub(crate) fn to_map(&self) -> BTreeMap<String, String> {
        self.fields.clone()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FieldRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Values resolved by the caller ahead of decoding, keyed by parameter or
/// field name. An entry always wins over decoding the same name from text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedContext {
    values: HashMap<String, Value>,
}

impl ResolvedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries among `names`, for handing down to a nested decode.
    pub fn subset(&self, names: &[&str]) -> ResolvedContext {
        ResolvedContext {
            values: names
                .iter()
                .filter_map(|n| self.values.get_key_value(*n))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Output row: `uuid` first, every other field in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: Vec<(String, String)>,
}

impl FlatRecord {
    pub fn from_map(mut map: BTreeMap<String, String>) -> Self {
        let mut fields = Vec::with_capacity(map.len());
        if let Some(uuid) = map.remove("uuid") {
            fields.push(("uuid".to_string(), uuid));
        }
        fields.extend(map);
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<FlatRecord> for FieldRecord {
    fn from(flat: FlatRecord) -> Self {
        flat.fields.into_iter().collect()
    }
}

impl From<&FlatRecord> for FieldRecord {
    fn from(flat: &FlatRecord) -> Self {
        flat.iter().collect()
    }
}
