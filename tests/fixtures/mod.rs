//! Synthetic map files for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER_SIZE: usize = 4 + 15 * 8;

pub const C1A0: &str = r#"{
"classname" "worldspawn"
"wad" "\half-life\valve\halflife.wad"
}
{
"classname" "monster_gman"
"targetname" "argumentg"
"origin" "-64 128 36"
}
{
"classname" "func_door"
"spawnflags" "19"
"renderamt" "255"
}
"#;

/// Build a container whose entity lump holds `text`.
pub fn container(version: i32, text: &[u8]) -> Vec<u8> {
    let mut lumps = [(0i32, 0i32); 15];
    lumps[0] = (HEADER_SIZE as i32, text.len() as i32);
    container_with(version, &lumps, text)
}

/// Build a container from an explicit lump directory and payload.
pub fn container_with(version: i32, lumps: &[(i32, i32); 15], payload: &[u8]) -> Vec<u8> {
    let mut bytes = version.to_le_bytes().to_vec();
    for (offset, length) in lumps {
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&length.to_le_bytes());
    }
    bytes.extend_from_slice(payload);
    bytes
}

/// Container with entities in the planes slot (Blue Shift layout)
pub fn swapped_container(text: &[u8]) -> Vec<u8> {
    let planes = [0u8; 40];
    let mut payload = planes.to_vec();
    payload.extend_from_slice(text);

    let mut lumps = [(0i32, 0i32); 15];
    lumps[0] = (HEADER_SIZE as i32, planes.len() as i32);
    lumps[1] = ((HEADER_SIZE + planes.len()) as i32, text.len() as i32);
    container_with(30, &lumps, &payload)
}

pub fn write_file(path: &Path, bytes: &[u8]) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
    path.to_path_buf()
}

/// A Steam install with one Half-Life mod holding `maps/c1a0.bsp`.
pub fn steam_install(root: &Path) -> PathBuf {
    let valve = root.join("steamapps/common/Half-Life/valve");
    write_file(&valve.join("liblist.gam"), b"game \"Half-Life\"\n");
    write_file(&valve.join("maps/c1a0.bsp"), &container(30, C1A0.as_bytes()));
    root.to_path_buf()
}
