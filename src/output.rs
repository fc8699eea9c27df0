//! Printing scan results as a colored report or as JSON

use crate::error::ErrorKind;
use crate::query::EntityEntry;
use crate::scan::ScanSummary;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Color only when asked for and stdout is a terminal
pub fn color_choice(color: bool) -> ColorChoice {
    if color && io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print the human-readable report to stdout
pub fn print_report(summary: &ScanSummary, color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));
    write_report(&mut stdout, summary)
}

/// Write the report:
///
/// ```text
/// Number of matches found: 1
///
/// Half-Life/valve/maps/c1a0.bsp: [
///   monster_gman (index 55, targetname 'argumentg', classname=monster_gman)
/// ]
/// ```
pub fn write_report<W: WriteColor>(out: &mut W, summary: &ScanSummary) -> io::Result<()> {
    if summary.interrupted {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(out, "Interrupted, showing results of {} files", summary.files_checked)?;
        out.reset()?;
    }

    if summary.matches.is_empty() {
        writeln!(out, "No matches were found, checked {} .bsp files", summary.files_checked)?;
        return Ok(());
    }

    writeln!(out, "Number of matches found: {}\n", summary.match_count())?;

    for (map, entries) in &summary.matches {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{}", map.display())?;
        out.reset()?;
        writeln!(out, ": [")?;

        for entry in entries {
            write_entry(out, entry)?;
        }

        writeln!(out, "]")?;
    }

    Ok(())
}

/// One `  classname (index i, targetname 't', description)` line
fn write_entry<W: WriteColor>(out: &mut W, entry: &EntityEntry) -> io::Result<()> {
    write!(out, "  ")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", entry.classname)?;
    out.reset()?;

    write!(out, " (index {}", entry.index)?;
    if !entry.targetname.is_empty() {
        write!(out, ", targetname '")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "{}", entry.targetname)?;
        out.reset()?;
        write!(out, "'")?;
    }
    if !entry.description.is_empty() {
        write!(out, ", {}", entry.description)?;
    }
    writeln!(out, ")")
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    path: &'a PathBuf,
    kind: ErrorKind,
    error: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    match_count: usize,
    files_checked: usize,
    interrupted: bool,
    matches: &'a BTreeMap<PathBuf, Vec<EntityEntry>>,
    failures: Vec<JsonFailure<'a>>,
}

/// Write the summary as one pretty-printed JSON document
pub fn write_json<W: Write>(out: &mut W, summary: &ScanSummary) -> serde_json::Result<()> {
    let report = JsonReport {
        match_count: summary.match_count(),
        files_checked: summary.files_checked,
        interrupted: summary.interrupted,
        matches: &summary.matches,
        failures: summary
            .failures
            .iter()
            .map(|f| JsonFailure {
                path: &f.path,
                kind: f.error.kind(),
                error: f.error.to_string(),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out).map_err(serde_json::Error::io)
}

pub fn print_json(summary: &ScanSummary) -> serde_json::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_json(&mut lock, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::scan::ScanFailure;
    use termcolor::NoColor;

    fn entry(index: usize, classname: &str, targetname: &str, description: &str) -> EntityEntry {
        EntityEntry {
            index,
            classname: classname.to_string(),
            targetname: targetname.to_string(),
            description: description.to_string(),
            matched: true,
            ..EntityEntry::default()
        }
    }

    fn render(summary: &ScanSummary) -> String {
        let mut out = NoColor::new(Vec::new());
        write_report(&mut out, summary).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_report_format() {
        let mut summary = ScanSummary {
            files_checked: 2,
            ..ScanSummary::default()
        };
        summary.matches.insert(
            PathBuf::from("Half-Life/valve/maps/c1a0.bsp"),
            vec![
                entry(55, "monster_gman", "argumentg", "classname=monster_gman AND targetname=argumentg"),
                entry(60, "monster_scientist", "", "classname=monster_scientist"),
            ],
        );

        assert_eq!(
            render(&summary),
            "Number of matches found: 2\n\n\
             Half-Life/valve/maps/c1a0.bsp: [\n  \
             monster_gman (index 55, targetname 'argumentg', classname=monster_gman AND targetname=argumentg)\n  \
             monster_scientist (index 60, classname=monster_scientist)\n\
             ]\n"
        );
    }

    #[test]
    fn test_report_without_matches() {
        let summary = ScanSummary {
            files_checked: 12,
            ..ScanSummary::default()
        };
        assert_eq!(render(&summary), "No matches were found, checked 12 .bsp files\n");
    }

    #[test]
    fn test_report_mentions_interrupt() {
        let summary = ScanSummary {
            files_checked: 3,
            interrupted: true,
            ..ScanSummary::default()
        };
        assert!(render(&summary).starts_with("Interrupted, showing results of 3 files\n"));
    }

    #[test]
    fn test_json_report() {
        let mut summary = ScanSummary {
            files_checked: 2,
            ..ScanSummary::default()
        };
        summary
            .matches
            .insert(PathBuf::from("a.bsp"), vec![entry(1, "light", "", "classname=light")]);
        summary.failures.push(ScanFailure {
            path: PathBuf::from("b.bsp"),
            error: MapError::UnsupportedVersion(99),
        });

        let mut out = Vec::new();
        write_json(&mut out, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["match_count"], 1);
        assert_eq!(value["matches"]["a.bsp"][0]["classname"], "light");
        assert_eq!(value["matches"]["a.bsp"][0]["index"], 1);
        assert_eq!(value["failures"][0]["kind"], "format");
        assert_eq!(value["failures"][0]["error"], "Unexpected BSP version: 99");
    }
}
