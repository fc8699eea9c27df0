//! Entity query language.
//!
//! A query is `[key][op][value]`, e.g. `classname=monster`, `origin[2]>=128`
//! or `spawnflags!=4`. Queries are compiled once by [`parse_query`], tested
//! against entities with [`Query::test_entity`] and combined with AND/OR in
//! a [`QueryChain`].

pub mod chain;
pub mod matcher;
pub mod parser;
pub mod value;

pub use chain::{Join, QueryChain};
pub use matcher::EntityEntry;
pub use parser::{Operator, Query, Term, parse_query, parse_term};
pub use value::{QueryValue, parse_number};
