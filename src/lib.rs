//! # MER - Multi Entity Report
//!
//! MER searches the entity lumps of GoldSrc (Half-Life, Sven Co-op) `.bsp`
//! maps with small `key=value` queries and reports every matching entity.
//!
//! ## Architecture
//!
//! - [`bsp`] - Container header, entity lump location and entity tokenizing
//! - [`query`] - Query compiling, matching and AND/OR chains
//! - [`scan`] - Running a chain over many map files
//! - [`steam`] - Finding maps in a Steam install
//! - [`output`] - Colored and JSON reports
//! - [`interactive`] - Prompts for running without arguments
//! - [`utils`] - Configuration, progress and Ctrl-C handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use mer::query::QueryChain;
//! use mer::scan::scan_map;
//! use std::path::Path;
//!
//! let (chain, _mods) = QueryChain::from_terms(["classname=monster", "AND", "=argument"]);
//! let report = scan_map(Path::new("maps/c1a0.bsp"), &chain).unwrap();
//!
//! for entry in report.entries {
//!     println!("{} (index {}, {})", entry.classname, entry.index, entry.description);
//! }
//! ```

pub mod bsp;
pub mod error;
pub mod interactive;
pub mod output;
pub mod query;
pub mod scan;
pub mod steam;
pub mod utils;

pub use error::{ErrorKind, MapError};
