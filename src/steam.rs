//! Finding `.bsp` files in a Steam install or in explicit paths.

use crate::scan::MapTarget;
use crate::utils::AppConfig;
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use log::{debug, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Suffixes of the extra content directories Steam creates next to a mod
pub const STEAM_PIPES: [&str; 3] = ["_addon", "_hd", "_downloads"];

const SVEN_COOP: &str = "svencoop";
const SVEN_COOP_GAME: &str = "Sven Co-op";
const HALF_LIFE_GAME: &str = "Half-Life";
const MOD_MARKER: &str = "liblist.gam";

/// Steam directories tried when none is configured
pub fn default_steam_dirs() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        return vec![PathBuf::from("C:/Program Files (x86)/Steam")];
    }
    dirs::home_dir()
        .map(|home| {
            vec![
                home.join(".local/share/Steam"),
                home.join("snap/steam/common/.local/share/Steam"),
            ]
        })
        .unwrap_or_default()
}

/// Pick the Steam directory from the command line, the config or the defaults.
///
/// Returns `None` when nothing usable exists; the caller may then ask the user.
pub fn resolve_steam_dir(explicit: Option<&Path>, config: &AppConfig) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }

    if let Some(dir) = &config.steam_dir {
        if dir.is_dir() {
            return Some(dir.clone());
        }
        warn!("\"{}\" is not a directory", dir.display());
    }

    default_steam_dirs().into_iter().find(|dir| dir.is_dir())
}

/// `steamapps/common` below a Steam directory
pub fn common_dir(steam_dir: &Path) -> PathBuf {
    steam_dir.join("steamapps").join("common")
}

/// Strip one steampipe suffix: `valve_hd` is searched as `valve`.
pub fn un_steampipe(name: &str) -> &str {
    STEAM_PIPES
        .iter()
        .find_map(|pipe| name.strip_suffix(pipe).filter(|base| !base.is_empty()))
        .unwrap_or(name)
}

/// Normalize a mod name given on the command line.
pub fn normalize_mod(name: &str, case_sensitive: bool) -> String {
    let name = un_steampipe(name);
    if case_sensitive {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

/// Every mod directory of a Steam install
pub fn find_all_mods(common: &Path) -> Vec<PathBuf> {
    let mut mods = Vec::new();

    let sven = common.join(SVEN_COOP_GAME).join(SVEN_COOP);
    if sven.is_dir() {
        mods.push(sven);
    }

    let half_life = common.join(HALF_LIFE_GAME);
    let Ok(entries) = fs::read_dir(&half_life) else {
        debug!("no {} directory in {}", HALF_LIFE_GAME, common.display());
        return mods;
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.join(MOD_MARKER).is_file())
        .collect();
    found.sort();
    mods.extend(found);
    mods
}

/// Directories of the named mods; missing ones are skipped with a warning.
pub fn find_named_mods(common: &Path, mods: &[String]) -> Vec<PathBuf> {
    mods.iter()
        .filter_map(|name| {
            let game = if name == SVEN_COOP { SVEN_COOP_GAME } else { HALF_LIFE_GAME };
            let dir = common.join(game).join(name);
            if dir.is_dir() {
                Some(dir)
            } else {
                warn!("\"{}\" is not a directory", dir.display());
                None
            }
        })
        .collect()
}

/// A mod directory plus its existing steampipe siblings
pub fn with_steam_pipes(mod_dir: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![mod_dir.to_path_buf()];
    let (Some(parent), Some(base)) = (mod_dir.parent(), mod_dir.file_name()) else {
        return dirs;
    };
    let base = base.to_string_lossy();

    dirs.extend(
        STEAM_PIPES
            .iter()
            .map(|pipe| parent.join(format!("{base}{pipe}")))
            .filter(|dir| dir.is_dir()),
    );
    dirs
}

/// Matcher for map file names, ignoring extension case
pub fn bsp_matcher() -> Result<GlobMatcher> {
    let glob = GlobBuilder::new("*.bsp")
        .case_insensitive(true)
        .build()
        .context("Invalid map glob")?;
    Ok(glob.compile_matcher())
}

/// Shorten `.../<game>/<mod>/maps/<file>` for display.
pub fn short_name(path: &Path) -> PathBuf {
    let parts: Vec<Component> = path.components().collect();
    let start = parts.len().saturating_sub(4);
    parts[start..].iter().collect()
}

/// `maps/*.bsp` of one mod directory
fn maps_in_dir(mod_dir: &Path, matcher: &GlobMatcher) -> Vec<MapTarget> {
    let Ok(entries) = fs::read_dir(mod_dir.join("maps")) else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| matcher.is_match(entry.file_name()))
        .map(|entry| {
            let path = entry.path();
            let name = short_name(&path);
            MapTarget::new(path, name)
        })
        .collect()
}

/// Collect every map of the given mods (all mods when `mods` is empty).
pub fn find_maps(common: &Path, mods: &[String]) -> Result<Vec<MapTarget>> {
    let matcher = bsp_matcher()?;
    let mod_dirs = if mods.is_empty() {
        find_all_mods(common)
    } else {
        find_named_mods(common, mods)
    };

    let mut maps: Vec<MapTarget> = mod_dirs
        .iter()
        .flat_map(|dir| with_steam_pipes(dir))
        .flat_map(|dir| maps_in_dir(&dir, &matcher))
        .collect();
    sort_targets(&mut maps);

    debug!("found {} maps in {} mod directories", maps.len(), mod_dirs.len());
    Ok(maps)
}

/// Collect maps from explicit files and directories.
///
/// Files are taken as given; directories are walked recursively for `*.bsp`.
pub fn walk_paths(paths: &[PathBuf]) -> Result<Vec<MapTarget>> {
    let matcher = bsp_matcher()?;
    let mut maps = Vec::new();

    for path in paths {
        if path.is_file() {
            maps.push(MapTarget::from_path(path.clone()));
            continue;
        }
        if !path.is_dir() {
            warn!("\"{}\" does not exist", path.display());
            continue;
        }

        let walker = WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .build();

        maps.extend(
            walker
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
                .filter(|entry| matcher.is_match(entry.file_name()))
                .map(|entry| MapTarget::from_path(entry.into_path())),
        );
    }

    sort_targets(&mut maps);
    Ok(maps)
}

fn sort_targets(maps: &mut Vec<MapTarget>) {
    maps.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    maps.dedup_by(|a, b| a.path == b.path);
}
