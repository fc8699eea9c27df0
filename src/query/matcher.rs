//! Evaluating a single compiled query against one entity.

use super::parser::{Operator, Query};
use super::value::parse_number;
use crate::bsp::Entity;
use serde::Serialize;

/// Tolerance for the equality part of `>=` and `<=`
pub const NUMERIC_TOLERANCE: f64 = 0.01;

/// Key with bitmask query semantics
pub const SPAWNFLAGS: &str = "spawnflags";

/// Result of testing one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityEntry {
    /// Position of the entity within its map
    pub index: usize,
    pub classname: String,
    pub targetname: String,
    /// Entity key the query resolved to
    pub key: String,
    /// Entity value the query resolved to
    pub value: String,
    /// Human-readable description of the matching clause(s)
    pub description: String,
    pub matched: bool,
}

impl EntityEntry {
    pub(crate) fn new(entity: &Entity, index: usize) -> Self {
        Self {
            index,
            classname: entity.classname().to_string(),
            targetname: entity.targetname().to_string(),
            ..Self::default()
        }
    }

    fn hit(mut self, key: &str, value: &str, description: String) -> Self {
        self.key = key.to_string();
        self.value = value.to_string();
        self.description = description;
        self.matched = true;
        self
    }

    /// Forget everything a clause matched, keeping entity identity.
    pub(crate) fn clear_match(&mut self) {
        self.key.clear();
        self.value.clear();
        self.description.clear();
        self.matched = false;
    }
}

/// Numeric comparison used by `<`, `>`, `<=` and `>=`.
fn compare(op: Operator, actual: f64, wanted: f64) -> bool {
    let close = (actual - wanted).abs() < NUMERIC_TOLERANCE;
    match op {
        Operator::Greater => actual > wanted,
        Operator::Less => actual < wanted,
        Operator::GreaterEquals => actual > wanted || close,
        Operator::LessEquals => actual < wanted || close,
        _ => false,
    }
}

/// Parse a `spawnflags` value as an unsigned bitmask.
fn parse_flags(value: &str) -> Option<u32> {
    let value = value.trim();
    value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u32)
    })
}

impl Query {
    /// Test this query alone against `entity`, ignoring any chain.
    pub fn test_entity(&self, entity: &Entity, index: usize) -> EntityEntry {
        let entry = EntityEntry::new(entity, index);

        // Nothing to test
        if self.key.is_empty() && self.value.is_any() {
            return entry;
        }

        if let Some(element) = self.index {
            return self.test_element(entity, element, entry);
        }

        if self.key == SPAWNFLAGS {
            if let (Some(mask), Some(flags)) = (self.value.number(), entity.get(SPAWNFLAGS)) {
                return self.test_spawnflags(flags, mask, entry);
            }
        }

        match self.op {
            Operator::StartsWith => self.test_starts_with(entity, entry),
            Operator::Exact => self.test_exact(entity, entry),
            Operator::NotEquals => self.test_not_equals(entity, entry),
            _ => self.test_numeric(entity, entry),
        }
    }

    /// `key[N]` queries: compare one whitespace-separated element of the value.
    ///
    /// An index past the end refers to a missing element, which compares as
    /// an empty string and never as a number.
    fn test_element(&self, entity: &Entity, element: i32, mut entry: EntityEntry) -> EntityEntry {
        let Some(full) = entity.get(&self.key).filter(|_| !self.key.is_empty()) else {
            return entry;
        };

        let parts: Vec<&str> = full.split_whitespace().collect();
        let position = if element < 0 {
            (!parts.is_empty()).then(|| element.rem_euclid(parts.len() as i32) as usize)
        } else {
            Some(element as usize)
        };
        let needle = position.and_then(|p| parts.get(p).copied());
        let actual = needle.unwrap_or("");
        let wanted = self.value.as_str();

        let matched = match self.op {
            Operator::StartsWith => actual.starts_with(wanted),
            Operator::Exact => actual == wanted,
            Operator::NotEquals => !actual.starts_with(wanted),
            op => match (self.value.number(), needle.and_then(parse_number)) {
                (Some(wanted), Some(actual)) => compare(op, actual, wanted),
                _ => false,
            },
        };

        if !matched {
            entry.key = self.key.clone();
            return entry;
        }

        let label = format!("{}[{}]", self.key, element);
        let description = match self.op {
            Operator::Exact => format!("{label}=={actual}"),
            Operator::NotEquals => not_equals_description(&label, wanted, actual),
            _ => format!("{label}={actual}"),
        };
        entry.hit(&self.key, actual, description)
    }

    /// `spawnflags` with a numeric value is a bitmask test.
    fn test_spawnflags(&self, flags: &str, mask: f64, entry: EntityEntry) -> EntityEntry {
        let Some(bits) = parse_flags(flags) else {
            return entry;
        };
        let mask = mask as u32;

        let matched = match self.op {
            // Any of the bits set
            Operator::StartsWith => bits & mask != 0,
            // Exactly this bit pattern
            Operator::Exact => bits == mask,
            // None of the bits set
            Operator::NotEquals => bits & mask == 0,
            _ => false,
        };

        if !matched {
            return entry;
        }

        let description = match self.op {
            Operator::NotEquals => format!("{}!={}", SPAWNFLAGS, self.value.as_str()),
            op => format!("{}{}{}", SPAWNFLAGS, op, flags),
        };
        entry.hit(SPAWNFLAGS, flags, description)
    }

    fn test_starts_with(&self, entity: &Entity, mut entry: EntityEntry) -> EntityEntry {
        let wanted = self.value.as_str();

        if !self.key.is_empty() {
            // First key starting with the query key decides
            let Some((key, value)) = entity
                .iter()
                .find(|(k, _)| !k.is_empty() && k.starts_with(&self.key))
            else {
                return entry;
            };

            if self.value.is_any() {
                return entry.hit(key, "", format!("{key}="));
            }
            if value.starts_with(wanted) {
                return entry.hit(key, value, format!("{key}={value}"));
            }
            entry.key = key.to_string();
            return entry;
        }

        match value_starting_with(entity, wanted) {
            Some((key, value)) => entry.hit(key, value, format!("{key}={value}")),
            None => entry,
        }
    }

    fn test_exact(&self, entity: &Entity, mut entry: EntityEntry) -> EntityEntry {
        let wanted = self.value.as_str();

        if !self.key.is_empty() {
            let Some(value) = entity.get(&self.key) else {
                return entry;
            };
            if self.value.is_any() {
                return entry.hit(&self.key, "", format!("{}=", self.key));
            }
            if value == wanted {
                return entry.hit(&self.key, value, format!("{}={}", self.key, value));
            }
            entry.key = self.key.clone();
            return entry;
        }

        match entity.iter().find(|(_, v)| *v == wanted) {
            Some((key, value)) => entry.hit(key, value, format!("{key}={value}")),
            None => entry,
        }
    }

    fn test_not_equals(&self, entity: &Entity, entry: EntityEntry) -> EntityEntry {
        let wanted = self.value.as_str();
        let shown = format!("!{wanted}");

        if !self.key.is_empty() {
            return match entity.get(&self.key) {
                None => entry.hit(&self.key, &shown, format!("{}!={}", self.key, wanted)),
                Some(actual) if !actual.starts_with(wanted) => {
                    let description = not_equals_description(&self.key, wanted, actual);
                    entry.hit(&self.key, &shown, description)
                }
                Some(_) => entry,
            };
        }

        if value_starting_with(entity, wanted).is_none() {
            return entry.hit("", &shown, format!("!={wanted}"));
        }
        entry
    }

    fn test_numeric(&self, entity: &Entity, mut entry: EntityEntry) -> EntityEntry {
        let Some(wanted) = self.value.number() else {
            return entry;
        };
        let satisfies = |value: &str| parse_number(value).is_some_and(|n| compare(self.op, n, wanted));

        if !self.key.is_empty() {
            let Some(value) = entity.get(&self.key) else {
                return entry;
            };
            if satisfies(value) {
                return entry.hit(&self.key, value, format!("{}={}", self.key, value));
            }
            entry.key = self.key.clone();
            return entry;
        }

        match entity.iter().find(|&(_, v)| satisfies(v)) {
            Some((key, value)) => entry.hit(key, value, format!("{key}={value}")),
            None => entry,
        }
    }
}

/// First non-empty value starting with `prefix`.
fn value_starting_with<'e>(entity: &'e Entity, prefix: &str) -> Option<(&'e str, &'e str)> {
    entity
        .iter()
        .find(|(_, v)| !v.is_empty() && v.starts_with(prefix))
}

fn not_equals_description(label: &str, wanted: &str, actual: &str) -> String {
    if actual.is_empty() {
        format!("{label}!={wanted}")
    } else {
        format!("{label}!={wanted} ({actual})")
    }
}
