use indexmap::IndexMap;

/// One `{ ... }` block of key/value pairs.
///
/// Keys are unique; a later duplicate overwrites the earlier value but keeps
/// its position, so iteration follows first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    fields: IndexMap<String, String>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Key/value pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `classname`, or empty when the entity has none
    pub fn classname(&self) -> &str {
        self.get("classname").unwrap_or("")
    }

    /// `targetname`, or empty when the entity has none
    pub fn targetname(&self) -> &str {
        self.get("targetname").unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        for (key, value) in iter {
            entity.insert(key, value);
        }
        entity
    }
}

/// Decode map text as Latin-1: every byte becomes the char with the same code point.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
