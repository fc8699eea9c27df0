use super::value::QueryValue;
use serde::Serialize;
use std::fmt;

/// Comparison operator of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `=`: key/value starting with the given text
    StartsWith,
    /// `==`: exact key/value
    Exact,
    /// `!=`: key missing or value not starting with the given text
    NotEquals,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterEquals,
    /// `<=`
    LessEquals,
}

impl Operator {
    /// Operators in the order they are searched for in a raw query.
    ///
    /// Two-character operators come first so `==` is not read as `=`.
    pub const SCAN_ORDER: [Operator; 7] = [
        Operator::Exact,
        Operator::LessEquals,
        Operator::GreaterEquals,
        Operator::NotEquals,
        Operator::StartsWith,
        Operator::Less,
        Operator::Greater,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::StartsWith => "=",
            Operator::Exact => "==",
            Operator::NotEquals => "!=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterEquals => ">=",
            Operator::LessEquals => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A compiled `key<op>value` predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub op: Operator,
    /// Key to test; empty means any key
    pub key: String,
    pub value: QueryValue,
    /// Element index for `key[N]` queries
    pub index: Option<i32>,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(index) = self.index {
            write!(f, "[{}]", index)?;
        }
        write!(f, "{}{}", self.op, self.value.as_str())
    }
}

/// One command-line or interactive term
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Query(Query),
    /// No operator found; callers treat this as a mod name
    Word(String),
}

/// Classify a raw term as a query or a bare word.
pub fn parse_term(input: &str) -> Term {
    match parse_query(input) {
        Some(query) => Term::Query(query),
        None => Term::Word(input.to_string()),
    }
}

/// Compile a raw `key<op>value` string.
///
/// Operators are searched in [`Operator::SCAN_ORDER`]; the first one found
/// anywhere in the input splits it at its first occurrence. Returns `None`
/// when the input contains no operator at all.
pub fn parse_query(input: &str) -> Option<Query> {
    let (op, pos) = Operator::SCAN_ORDER
        .iter()
        .find_map(|&op| input.find(op.symbol()).map(|pos| (op, pos)))?;

    let raw_key = &input[..pos];
    let raw_value = &input[pos + op.symbol().len()..];
    let (key, index) = split_index(raw_key);

    Some(Query {
        op,
        key: key.to_string(),
        value: QueryValue::new(raw_value),
        index,
    })
}

/// Split `name[N]` into `name` and `N`. Keys without a valid index are returned unchanged.
fn split_index(key: &str) -> (&str, Option<i32>) {
    let (Some(open), Some(close)) = (key.find('['), key.find(']')) else {
        return (key, None);
    };
    if close < open {
        return (key, None);
    }
    match key[open + 1..close].trim().parse::<i32>() {
        Ok(index) => (&key[..open], Some(index)),
        Err(_) => (key, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(input: &str) -> Query {
        parse_query(input).unwrap()
    }

    #[test]
    fn test_key_value() {
        let q = query("targetname=test");
        assert_eq!(q.key, "targetname");
        assert_eq!(q.value.as_str(), "test");
        assert_eq!(q.op, Operator::StartsWith);
        assert_eq!(q.index, None);
    }

    #[test]
    fn test_only_key() {
        let q = query("targetname=");
        assert_eq!(q.key, "targetname");
        assert!(q.value.is_any());
    }

    #[test]
    fn test_only_value() {
        let q = query("=test");
        assert_eq!(q.key, "");
        assert_eq!(q.value.as_str(), "test");
    }

    #[test]
    fn test_all_operators() {
        let cases = [
            ("health==50", Operator::Exact),
            ("health<=50", Operator::LessEquals),
            ("health>=50", Operator::GreaterEquals),
            ("health!=50", Operator::NotEquals),
            ("health=50", Operator::StartsWith),
            ("health<50", Operator::Less),
            ("health>50", Operator::Greater),
        ];
        for (input, op) in cases {
            let q = query(input);
            assert_eq!(q.op, op, "{input}");
            assert_eq!(q.key, "health");
            assert_eq!(q.value.number(), Some(50.0));
        }
    }

    #[test]
    fn test_scan_order_wins_over_position() {
        // `==` is searched before `<`, even though `<` comes first in the text
        let q = query("a<b==c");
        assert_eq!(q.op, Operator::Exact);
        assert_eq!(q.key, "a<b");
        assert_eq!(q.value.as_str(), "c");

        // A value containing `=` splits at the first `=`
        let q = query("message=a=b");
        assert_eq!(q.key, "message");
        assert_eq!(q.value.as_str(), "a=b");
    }

    #[test]
    fn test_mod_name_is_not_a_query() {
        assert!(parse_query("valve").is_none());
        assert_eq!(parse_term("valve"), Term::Word("valve".to_string()));
        assert!(matches!(parse_term("a=b"), Term::Query(_)));
    }

    #[test]
    fn test_indexed_key() {
        let q = query("origin[2]=128");
        assert_eq!(q.key, "origin");
        assert_eq!(q.index, Some(2));
        assert_eq!(q.value.number(), Some(128.0));

        let q = query("origin[-1]<0");
        assert_eq!(q.key, "origin");
        assert_eq!(q.index, Some(-1));
        assert_eq!(q.op, Operator::Less);
    }

    #[test]
    fn test_malformed_index_keeps_key() {
        assert_eq!(query("origin[x]=1").key, "origin[x]");
        assert_eq!(query("origin]1[=1").index, None);
        assert_eq!(query("origin[1=1").index, None);
    }

    #[test]
    fn test_numeric_value_classification() {
        assert_eq!(query("renderamt>=255").value.number(), Some(255.0));
        assert_eq!(query("angles=0 90 0").value.number(), Some(0.0));
        assert_eq!(query("skin=12#hash").value.number(), Some(12.0));
        assert_eq!(query("classname=monster").value.number(), None);
    }

    #[test]
    fn test_display_round_trips_input() {
        for input in ["classname=monster", "origin[2]>=128", "!=light", "spawnflags==3"] {
            assert_eq!(query(input).to_string(), input);
        }
    }
}
