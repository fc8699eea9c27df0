//! Multi-file scan driver.
//!
//! Each map file is opened, tokenized and tested on its own; nothing is
//! shared between files except the read-only query chain. A stop flag is
//! checked before each file is started, never in the middle of one.

use crate::bsp::MapFile;
use crate::error::{MapError, Result};
use crate::query::{EntityEntry, QueryChain};
use crate::utils::progress::{self, ProgressBar};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Matches found in one map
#[derive(Debug, Default)]
pub struct MapReport {
    /// Matching entries in entity order
    pub entries: Vec<EntityEntry>,
    /// Entities parsed, matching or not
    pub entity_count: usize,
}

/// Test every entity of the map at `path` against `chain`.
///
/// Any error discards the entries collected so far.
pub fn scan_map(path: &Path, chain: &QueryChain) -> Result<MapReport> {
    let map = MapFile::open(path)?;
    debug!(
        "{}: BSP version {}, entities in {} lump",
        map.path().display(),
        map.header().version,
        map.entity_lump().index.name()
    );

    let mut report = MapReport::default();
    for (index, entity) in map.entities().enumerate() {
        let entity = entity?;
        report.entity_count += 1;

        let entry = chain.test(&entity, index);
        if entry.matched {
            report.entries.push(entry);
        }
    }
    Ok(report)
}

/// A map file to scan and the name it is reported under
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MapTarget {
    pub path: PathBuf,
    pub name: PathBuf,
}

impl MapTarget {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Report the file under its own path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.clone(),
            path,
        }
    }
}

/// A file that could not be scanned
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: MapError,
}

/// Aggregated result of a scan
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Files with at least one match, sorted by name
    pub matches: BTreeMap<PathBuf, Vec<EntityEntry>>,
    pub failures: Vec<ScanFailure>,
    /// Files opened, including failures
    pub files_checked: usize,
    /// Entities tested across all files
    pub entities_checked: usize,
    /// The stop flag ended the scan early
    pub interrupted: bool,
}

impl ScanSummary {
    pub fn match_count(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    fn record(&mut self, target: &MapTarget, outcome: Result<MapReport>) {
        self.files_checked += 1;
        match outcome {
            Ok(report) => {
                self.entities_checked += report.entity_count;
                if !report.entries.is_empty() {
                    self.matches
                        .entry(target.name.clone())
                        .or_default()
                        .extend(report.entries);
                }
            }
            Err(error) => {
                warn!("{}: {}", target.name.display(), error);
                self.failures.push(ScanFailure {
                    path: target.name.clone(),
                    error,
                });
            }
        }
    }
}

/// Runs one query chain over many map files
pub struct Scanner<'a> {
    chain: &'a QueryChain,
    stop: &'a AtomicBool,
    /// Worker count; `None` scans on the calling thread
    threads: Option<usize>,
    progress: ProgressBar,
}

impl<'a> Scanner<'a> {
    pub fn new(chain: &'a QueryChain, stop: &'a AtomicBool) -> Self {
        Self {
            chain,
            stop,
            threads: None,
            progress: progress::hidden(),
        }
    }

    /// Shard files across `threads` rayon workers.
    pub fn parallel(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn scan_one(&self, target: &MapTarget) -> Result<MapReport> {
        self.progress.set_message(target.name.display().to_string());
        let outcome = scan_map(&target.path, self.chain);
        self.progress.inc(1);
        outcome
    }

    pub fn run(&self, targets: &[MapTarget]) -> ScanSummary {
        let summary = match self.threads {
            Some(threads) if threads > 1 && targets.len() > 1 => self.run_parallel(targets, threads),
            _ => self.run_sequential(targets),
        };
        self.progress.finish_and_clear();

        info!(
            "checked {} files ({} entities), {} matches, {} failures",
            summary.files_checked,
            summary.entities_checked,
            summary.match_count(),
            summary.failures.len()
        );
        if summary.interrupted {
            info!("scan interrupted after {} of {} files", summary.files_checked, targets.len());
        }
        summary
    }

    fn run_sequential(&self, targets: &[MapTarget]) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for target in targets {
            if self.stopped() {
                summary.interrupted = true;
                break;
            }
            summary.record(target, self.scan_one(target));
        }
        summary
    }

    fn run_parallel(&self, targets: &[MapTarget], threads: usize) -> ScanSummary {
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool,
            Err(e) => {
                warn!("could not start {} scan threads, scanning sequentially: {}", threads, e);
                return self.run_sequential(targets);
            }
        };

        // Files not yet started when the flag is raised are skipped
        let outcomes: Vec<Option<Result<MapReport>>> = pool.install(|| {
            targets
                .par_iter()
                .map(|target| (!self.stopped()).then(|| self.scan_one(target)))
                .collect()
        });

        let mut summary = ScanSummary::default();
        for (target, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                Some(outcome) => summary.record(target, outcome),
                None => summary.interrupted = true,
            }
        }
        summary
    }
}
