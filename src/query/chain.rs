//! AND/OR chains of queries.
//!
//! A chain is an ordered list of queries with a join tag between each
//! consecutive pair. The join after query `i` decides how its result
//! combines with the result of everything to its right, so
//! `a AND b OR c` reads as `a AND (b OR c)`.

use super::matcher::EntityEntry;
use super::parser::{Query, Term, parse_term};
use crate::bsp::Entity;
use serde::Serialize;

/// How a query combines with the rest of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Join {
    #[default]
    Or,
    And,
}

impl Join {
    fn separator(self) -> &'static str {
        match self {
            Join::Or => " OR ",
            Join::And => " AND ",
        }
    }

    /// Whether `entry` alone decides the result at this position.
    fn short_circuits(self, entry: &EntityEntry) -> bool {
        match self {
            Join::And => !entry.matched,
            Join::Or => entry.matched,
        }
    }
}

/// Ordered queries joined by AND/OR
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryChain {
    queries: Vec<Query>,
    /// `joins[i]` sits between `queries[i]` and `queries[i + 1]`
    joins: Vec<Join>,
    #[serde(skip)]
    pending: Join,
}

/// Keywords recognised between queries
fn join_keyword(term: &str) -> Option<Join> {
    if term.eq_ignore_ascii_case("and") {
        Some(Join::And)
    } else if term.eq_ignore_ascii_case("or") {
        Some(Join::Or)
    } else {
        None
    }
}

impl QueryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query, joined to the previous one by the pending join.
    pub fn push(&mut self, query: Query) {
        if !self.queries.is_empty() {
            self.joins.push(std::mem::take(&mut self.pending));
        }
        self.queries.push(query);
    }

    /// Join the most recent query to the next one with AND.
    pub fn set_and(&mut self) {
        if !self.queries.is_empty() {
            self.pending = Join::And;
        }
    }

    /// Feed one raw term. Returns the term back when it is neither a join
    /// keyword nor a query.
    pub fn push_term(&mut self, term: &str) -> Option<String> {
        if !self.queries.is_empty() {
            match join_keyword(term) {
                Some(Join::And) => {
                    self.set_and();
                    return None;
                }
                Some(Join::Or) => return None,
                None => {}
            }
        }

        match parse_term(term) {
            Term::Query(query) => {
                self.push(query);
                None
            }
            Term::Word(word) => Some(word),
        }
    }

    /// Build a chain from raw terms; terms that are not queries are returned separately.
    pub fn from_terms<I, S>(terms: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chain = Self::new();
        let words: Vec<String> = terms
            .into_iter()
            .filter_map(|term| chain.push_term(term.as_ref()))
            .collect();
        (chain, words)
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Evaluate the chain against one entity.
    ///
    /// Queries are tested left to right until one decides the result on its
    /// own (a failure before AND, a success before OR, or the last query).
    /// The undecided queries before it are then folded back over that result.
    pub fn test(&self, entity: &Entity, index: usize) -> EntityEntry {
        let mut undecided: Vec<(EntityEntry, Join)> = Vec::new();
        let mut result = None;

        for (position, query) in self.queries.iter().enumerate() {
            let entry = query.test_entity(entity, index);
            match self.joins.get(position) {
                Some(&join) if !join.short_circuits(&entry) => undecided.push((entry, join)),
                _ => {
                    result = Some(entry);
                    break;
                }
            }
        }

        let Some(mut result) = result else {
            return EntityEntry::new(entity, index);
        };

        while let Some((mut entry, join)) = undecided.pop() {
            match join {
                // `entry` matched; the rest must match too
                Join::And => {
                    if result.matched {
                        if !result.description.is_empty() {
                            entry.description.push_str(join.separator());
                            entry.description.push_str(&result.description);
                        }
                    } else {
                        entry.clear_match();
                    }
                }
                // `entry` failed; the rest decides
                Join::Or => {
                    if result.matched {
                        entry.key = result.key;
                        entry.value = result.value;
                        entry.matched = true;
                        if entry.description.is_empty() {
                            entry.description = result.description;
                        } else {
                            entry.description.push_str(join.separator());
                            entry.description.push_str(&result.description);
                        }
                    }
                }
            }
            result = entry;
        }

        result
    }
}
