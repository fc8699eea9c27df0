//! GoldSrc/Quake BSP container reading.
//!
//! Only the entity text is read. The pipeline is:
//!
//! 1. [`header::Header::read`] validates the version and lump directory
//! 2. [`lump::locate_entity_lump`] finds the lump holding entity text
//! 3. [`tokenizer::EntityTokenizer`] turns that byte range into [`Entity`] records

pub mod entity;
pub mod header;
pub mod lump;
pub mod tokenizer;

pub use entity::Entity;
pub use header::{Header, Lump, LumpIndex};
pub use lump::{ResolvedLump, locate_entity_lump};
pub use tokenizer::{EntityTokenizer, parse_entities};

use crate::error::{MapError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Resolve the header and entity lump of an in-memory container.
pub fn resolve(data: &[u8]) -> Result<(Header, ResolvedLump)> {
    let header = Header::read(&mut &data[..])?;
    let lump = locate_entity_lump(data, &header)?;
    Ok((header, lump))
}

/// Parse every entity of an in-memory container.
pub fn read_entities(data: &[u8]) -> Result<Vec<Entity>> {
    let (_, lump) = resolve(data)?;
    parse_entities(&data[lump.range.clone()], lump.range.start)
}

/// A memory-mapped map file with a validated header.
pub struct MapFile {
    path: PathBuf,
    data: Mmap,
    header: Header,
    lump: ResolvedLump,
}

impl MapFile {
    /// Open and validate a map file. No entity text is parsed yet.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len() as usize;
        if file_len < header::HEADER_SIZE {
            // Mapping an empty file is not portable; the header check fails anyway
            return Err(MapError::TruncatedHeader {
                expected: header::HEADER_SIZE,
                found: file_len,
            });
        }

        // The map is read-only and dropped before the file could be rewritten
        let data = unsafe { Mmap::map(&file)? };
        let (header, lump) = resolve(&data)?;

        Ok(Self {
            path: path.to_path_buf(),
            data,
            header,
            lump,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn entity_lump(&self) -> &ResolvedLump {
        &self.lump
    }

    /// Iterate the entities of the resolved lump.
    pub fn entities(&self) -> EntityTokenizer<'_> {
        EntityTokenizer::new(&self.data[self.lump.range.clone()], self.lump.range.start)
    }
}
