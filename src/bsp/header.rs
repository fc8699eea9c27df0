//! Fixed-size BSP header: a version field followed by the lump directory.
//!
//! Layout (all little-endian, tightly packed):
//! - 4 bytes: version (29 or 30)
//! - 15 x 8 bytes: lump records (`i32` offset, `i32` length)

use crate::error::{MapError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

/// Number of lump records in the header
pub const HEADER_LUMPS: usize = 15;

/// Size of one lump record on disk
pub const LUMP_SIZE: usize = 8;

/// Total header size on disk
pub const HEADER_SIZE: usize = 4 + HEADER_LUMPS * LUMP_SIZE;

/// Versions this reader understands (Quake/BSP29 and GoldSrc/BSP30)
pub const SUPPORTED_VERSIONS: [i32; 2] = [29, 30];

/// Lump slots in header order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum LumpIndex {
    Entities = 0,
    Planes = 1,
    Textures = 2,
    Vertices = 3,
    Visibility = 4,
    Nodes = 5,
    Texinfo = 6,
    Faces = 7,
    Lighting = 8,
    Clipnodes = 9,
    Leaves = 10,
    Marksurfaces = 11,
    Edges = 12,
    Surfedges = 13,
    Models = 14,
}

impl LumpIndex {
    pub fn name(self) -> &'static str {
        match self {
            LumpIndex::Entities => "entities",
            LumpIndex::Planes => "planes",
            LumpIndex::Textures => "textures",
            LumpIndex::Vertices => "vertices",
            LumpIndex::Visibility => "visibility",
            LumpIndex::Nodes => "nodes",
            LumpIndex::Texinfo => "texinfo",
            LumpIndex::Faces => "faces",
            LumpIndex::Lighting => "lighting",
            LumpIndex::Clipnodes => "clipnodes",
            LumpIndex::Leaves => "leaves",
            LumpIndex::Marksurfaces => "marksurfaces",
            LumpIndex::Edges => "edges",
            LumpIndex::Surfedges => "surfedges",
            LumpIndex::Models => "models",
        }
    }
}

/// One (offset, length) region of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lump {
    pub offset: i32,
    pub length: i32,
}

impl Lump {
    /// Byte range of this lump, if it lies fully inside a file of `file_len` bytes
    pub fn range(&self, file_len: usize) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(self.offset).ok()?;
        let length = usize::try_from(self.length).ok()?;
        let end = start.checked_add(length)?;
        (end <= file_len).then_some(start..end)
    }
}

/// Parsed container header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: i32,
    pub lumps: [Lump; HEADER_LUMPS],
}

impl Header {
    /// Read and validate a header from the start of `reader`.
    ///
    /// Fails with a format error when fewer than [`HEADER_SIZE`] bytes are
    /// available or the version is not in [`SUPPORTED_VERSIONS`].
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut consumed = 0usize;
        let truncated = |found: usize| MapError::TruncatedHeader {
            expected: HEADER_SIZE,
            found,
        };

        let version = read_i32(reader).map_err(|_| truncated(consumed))?;
        consumed += 4;

        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(MapError::UnsupportedVersion(version));
        }

        let mut lumps = [Lump::default(); HEADER_LUMPS];
        for lump in lumps.iter_mut() {
            lump.offset = read_i32(reader).map_err(|_| truncated(consumed))?;
            consumed += 4;
            lump.length = read_i32(reader).map_err(|_| truncated(consumed))?;
            consumed += 4;
        }

        Ok(Self { version, lumps })
    }

    pub fn lump(&self, index: LumpIndex) -> Lump {
        self.lumps[index as usize]
    }
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    reader.read_i32::<LittleEndian>()
}
