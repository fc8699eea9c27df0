//! Locating the entity text inside a container.
//!
//! Most maps keep their entities in lump 0. Some (Blue Shift) swap the
//! entities and planes lumps, so when lump 0 does not open with `{` after
//! whitespace and `//` comments, lump 1 is tried instead.

use super::header::{Header, LumpIndex};
use crate::error::{MapError, Result};
use log::debug;
use std::ops::Range;

/// The lump that was found to hold entity text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLump {
    pub index: LumpIndex,
    /// Authoritative byte bound for tokenizing
    pub range: Range<usize>,
    /// Position of the first `{` inside `range`
    pub first_brace: usize,
}

/// Why a single candidate lump was rejected
#[derive(Debug)]
enum Rejection {
    OutOfBounds(MapError),
    NotText,
}

/// Resolve the entity lump of `data`, falling back to the planes lump.
pub fn locate_entity_lump(data: &[u8], header: &Header) -> Result<ResolvedLump> {
    let primary = match probe(data, header, LumpIndex::Entities) {
        Ok(lump) => return Ok(lump),
        Err(rejection) => rejection,
    };

    debug!("entity lump rejected ({:?}), trying planes lump", primary);

    match probe(data, header, LumpIndex::Planes) {
        Ok(lump) => Ok(lump),
        Err(Rejection::OutOfBounds(_)) | Err(Rejection::NotText) => match primary {
            Rejection::OutOfBounds(err) => Err(err),
            Rejection::NotText => Err(MapError::UnexpectedFormat),
        },
    }
}

/// Check whether one lump starts with entity text.
fn probe(
    data: &[u8],
    header: &Header,
    index: LumpIndex,
) -> std::result::Result<ResolvedLump, Rejection> {
    let lump = header.lump(index);
    let range = lump.range(data.len()).ok_or_else(|| {
        Rejection::OutOfBounds(MapError::LumpOutOfBounds {
            lump: index.name(),
            offset: lump.offset,
            length: lump.length,
            file_len: data.len(),
        })
    })?;

    let text = &data[range.clone()];
    let start = skip_preamble(text, 0);
    if text.get(start) != Some(&b'{') {
        return Err(Rejection::NotText);
    }

    Ok(ResolvedLump {
        index,
        first_brace: range.start + start,
        range,
    })
}

/// Skip whitespace and whole `//` comment lines starting at `pos`.
pub(crate) fn skip_preamble(text: &[u8], mut pos: usize) -> usize {
    loop {
        while text.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }
        if text[pos.min(text.len())..].starts_with(b"//") {
            pos = skip_line(text, pos);
        } else {
            return pos;
        }
    }
}

/// Position just past the next `\n` at or after `pos` (or the end of `text`).
pub(crate) fn skip_line(text: &[u8], pos: usize) -> usize {
    let pos = pos.min(text.len());
    match memchr::memchr(b'\n', &text[pos..]) {
        Some(newline) => pos + newline + 1,
        None => text.len(),
    }
}
