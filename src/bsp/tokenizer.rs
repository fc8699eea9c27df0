//! Entity text tokenizer.
//!
//! Scans a bounded byte slice for `{ "key" "value" ... }` blocks. Bytes
//! outside of quoted tokens are ignored except for `{`, `}`, `"` and `//`
//! line comments, so loosely formatted entity text still parses. The only
//! lexical error is a quoted key without a quoted value after it (or a
//! token that runs into the end of the lump).

use super::entity::{Entity, latin1};
use super::lump::{skip_line, skip_preamble};
use crate::error::{MapError, Result};
use log::warn;

/// Safety cap on a single key or value; longer tokens are truncated.
pub const MAX_TOKEN_LENGTH: usize = 64 * 1024;

/// Iterator over the entities of one entity lump.
///
/// Yields `Err` at most once; iteration ends after the first error.
pub struct EntityTokenizer<'a> {
    text: &'a [u8],
    pos: usize,
    /// Absolute file offset of `text[0]`, for diagnostics
    base: usize,
    failed: bool,
}

impl<'a> EntityTokenizer<'a> {
    /// Tokenize `text`, which starts at absolute file offset `base`.
    pub fn new(text: &'a [u8], base: usize) -> Self {
        Self {
            text,
            pos: 0,
            base,
            failed: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn at_comment(&self) -> bool {
        self.text[self.pos.min(self.text.len())..].starts_with(b"//")
    }

    /// Parse one entity; `start` is the position of its `{`.
    fn read_entity(&mut self, start: usize) -> Result<Entity> {
        let mut entity = Entity::new();

        loop {
            if self.at_comment() {
                self.pos = skip_line(self.text, self.pos);
                continue;
            }

            // An entity cut off by the lump bound keeps what it has
            let Some(c) = self.bump() else {
                return Ok(entity);
            };

            match c {
                b'}' => return Ok(entity),
                b'"' => {
                    let key = self.read_token(start)?;
                    self.skip_whitespace();

                    if self.bump() != Some(b'"') {
                        return Err(self.token_error(start));
                    }
                    let value = self.read_token(start)?;
                    entity.insert(key, value);

                    // Trailing comment after a pair (seen in some Sven Co-op maps)
                    if self.peek() == Some(b'/') {
                        self.pos = skip_line(self.text, self.pos);
                    }
                }
                _ => {}
            }
        }
    }

    /// Read up to the closing quote. Newlines become a literal `\n`, carriage returns are dropped.
    fn read_token(&mut self, start: usize) -> Result<String> {
        let mut token = String::new();
        // Counted in map bytes; high Latin-1 bytes take two bytes in `token`
        let mut length = 0;
        let mut truncated = false;

        loop {
            let Some(c) = self.bump() else {
                return Err(self.token_error(start));
            };

            if c == b'"' {
                break;
            }
            if c == b'\r' {
                continue;
            }
            if length >= MAX_TOKEN_LENGTH {
                truncated = true;
                continue;
            }
            length += 1;
            if c == b'\n' {
                token.push_str("\\n");
            } else {
                token.push(c as char);
            }
        }

        if truncated {
            warn!(
                "token at byte {} truncated to {} bytes",
                self.base + start,
                MAX_TOKEN_LENGTH
            );
        }
        Ok(token)
    }

    fn token_error(&self, start: usize) -> MapError {
        let end = self.pos.min(self.text.len());
        MapError::Token {
            offset: self.base + start,
            raw: latin1(&self.text[start..end]),
        }
    }
}

impl Iterator for EntityTokenizer<'_> {
    type Item = Result<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.pos = skip_preamble(self.text, self.pos);
            let c = self.peek()?;

            if c != b'{' {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            self.pos += 1;
            let entity = self.read_entity(start);
            self.failed = entity.is_err();
            return Some(entity);
        }
    }
}

/// Parse all entities of `text` in encounter order.
pub fn parse_entities(text: &[u8], base: usize) -> Result<Vec<Entity>> {
    EntityTokenizer::new(text, base).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<Entity>> {
        parse_entities(text.as_bytes(), 0)
    }

    #[test]
    fn test_single_entity() {
        let entities = parse(r#"{"classname" "info_player_start"}"#).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].len(), 1);
        assert_eq!(entities[0].get("classname"), Some("info_player_start"));
    }

    #[test]
    fn test_entities_in_encounter_order() {
        let text = "{\n\"classname\" \"worldspawn\"\n\"wad\" \"halflife.wad\"\n}\n{\n\"classname\" \"light\"\n}\n";
        let entities = parse(text).unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].classname(), "worldspawn");
        assert_eq!(entities[0].get("wad"), Some("halflife.wad"));
        assert_eq!(entities[1].classname(), "light");
    }

    #[test]
    fn test_empty_entity() {
        let entities = parse("{ }{}").unwrap();
        assert_eq!(entities.len(), 2);
        assert!(entities[0].is_empty());
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "// header comment\n{\n\"classname\" \"monster_gman\" // inline\n\"targetname\" \"argumentg\"\n}\n// {\"classname\" \"ignored\"}\n";
        let entities = parse(text).unwrap();

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].get("classname"), Some("monster_gman"));
        assert_eq!(entities[0].get("targetname"), Some("argumentg"));
    }

    #[test]
    fn test_trailing_slash_comment_right_after_value() {
        let text = "{\"classname\" \"func_door\"// speed tweak\n\"speed\" \"100\"}";
        let entities = parse(text).unwrap();
        assert_eq!(entities[0].get("speed"), Some("100"));
    }

    #[test]
    fn test_newlines_escaped_and_cr_dropped() {
        let text = "{\"message\" \"line one\r\nline two\"}";
        let entities = parse(text).unwrap();
        assert_eq!(entities[0].get("message"), Some("line one\\nline two"));
    }

    #[test]
    fn test_backslashes_pass_through() {
        let text = r#"{"wad" "\half-life\valve\halflife.wad;\sierra\"}"#;
        let entities = parse(text).unwrap();
        assert_eq!(entities[0].get("wad"), Some(r"\half-life\valve\halflife.wad;\sierra\"));
    }

    #[test]
    fn test_stray_bytes_are_ignored() {
        let entities = parse("junk { x \"classname\" \"light\" y }").unwrap();
        assert_eq!(entities[0].classname(), "light");
    }

    #[test]
    fn test_missing_value_is_token_error() {
        let text = "{\"classname\" \"light\"}\n{\"classname\" oops}";
        let err = parse(text).unwrap_err();

        match err {
            MapError::Token { offset, raw } => {
                assert_eq!(offset, 22);
                assert_eq!(raw, "{\"classname\" o");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_key_reports_rest_of_input() {
        let text = "{\"classname";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, MapError::Token { offset: 0, ref raw } if raw == text));
    }

    #[test]
    fn test_unclosed_value_is_token_error() {
        let err = parse("{\"classname\" \"light").unwrap_err();
        assert!(matches!(err, MapError::Token { .. }));
    }

    #[test]
    fn test_error_offset_is_absolute() {
        let err = parse_entities(b"{\"a\" b}", 1000).unwrap_err();
        assert!(matches!(err, MapError::Token { offset: 1000, .. }));
    }

    #[test]
    fn test_iteration_stops_after_error() {
        let mut tokenizer = EntityTokenizer::new(b"{\"a\" b}{\"c\" \"d\"}", 0);
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_entity_cut_by_bound_is_kept() {
        let entities = parse("{\"classname\" \"light\"").unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].classname(), "light");
    }

    #[test]
    fn test_oversized_token_is_truncated() {
        let long = "x".repeat(MAX_TOKEN_LENGTH + 10);
        let text = format!("{{\"message\" \"{long}\" \"classname\" \"info_target\"}}");
        let entities = parse(&text).unwrap();

        assert_eq!(entities[0].get("message").map(str::len), Some(MAX_TOKEN_LENGTH));
        assert_eq!(entities[0].classname(), "info_target");
    }

    #[test]
    fn test_token_cap_counts_map_bytes() {
        let mut text = b"{\"message\" \"".to_vec();
        text.extend(std::iter::repeat_n(0xe9u8, 40_000));
        text.extend(b"\"}");
        let entities = parse_entities(&text, 0).unwrap();
        assert_eq!(entities[0].get("message").map(|v| v.chars().count()), Some(40_000));

        let mut text = b"{\"message\" \"".to_vec();
        text.extend(std::iter::repeat_n(0xe9u8, MAX_TOKEN_LENGTH + 5));
        text.extend(b"\"}");
        let entities = parse_entities(&text, 0).unwrap();
        assert_eq!(
            entities[0].get("message").map(|v| v.chars().count()),
            Some(MAX_TOKEN_LENGTH)
        );
    }

    #[test]
    fn test_latin1_bytes() {
        let entities = parse_entities(b"{\"message\" \"caf\xe9\"}", 0).unwrap();
        assert_eq!(entities[0].get("message"), Some("caf\u{e9}"));
    }
}
