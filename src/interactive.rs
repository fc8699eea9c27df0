//! Line-based prompts used when no query is given on the command line.

use crate::query::QueryChain;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

pub const QUERY_HELP: &str = "\
Search queries are key=value pairs. Multiple queries can be entered separated by spaces.
The value can be left out to only match the key,
or the key can be left out to search for any matching value.
Different operators can be used:
 =              Match key/value starting with these terms
 ==             Match only exact key/value
 !=             Match only different key/value
 <, >, <=, >=   Numerical comparison on the value (less than, greater than, etc)
Keys with multiple space-separated values can be indexed with square brackets,
e.g.: origin[1] to query the second value.
Queries are implicitly or-chained. Use the AND keyword to and-chain queries.
Example: classname=monster AND =argument AND origin[2]<200
";

/// Number of tries for entering a Steam directory
pub const STEAM_DIR_ATTEMPTS: usize = 3;

/// Prompts over any line reader and writer
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line without its line ending.
    /// End of input reads as an empty line.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Yes/no question; an empty answer gives `default`.
    pub fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let answer = self.ask(prompt)?;
        Ok(match answer.trim().chars().next() {
            None => default,
            Some(c) => c.eq_ignore_ascii_case(&'y'),
        })
    }

    /// Ask for mods to search; an empty answer means every mod.
    pub fn ask_mods(&mut self) -> io::Result<Vec<String>> {
        let answer = self.ask("Specify mods to narrow search by (leave empty for global search): ")?;
        Ok(answer.split_whitespace().map(str::to_string).collect())
    }

    /// Print the query help and read queries into `chain`.
    ///
    /// Terms that are not queries are reported and dropped.
    pub fn ask_queries(&mut self, chain: &mut QueryChain) -> io::Result<()> {
        write!(self.output, "{QUERY_HELP}")?;
        let answer = self.ask("Enter search queries: ")?;

        for term in answer.split_whitespace() {
            if let Some(invalid) = chain.push_term(term) {
                writeln!(self.output, "Invalid query: {invalid}")?;
            }
        }
        Ok(())
    }

    /// Ask for a Steam directory until an existing one is entered.
    pub fn ask_steam_dir(&mut self) -> io::Result<Option<PathBuf>> {
        for _ in 0..STEAM_DIR_ATTEMPTS {
            let answer = self.ask("Enter path to Steam directory: ")?;
            let dir = PathBuf::from(answer.trim());
            if dir.is_dir() {
                return Ok(Some(dir));
            }
            writeln!(self.output, "\"{}\" is not a directory", dir.display())?;
        }
        Ok(None)
    }

    pub fn wait_for_enter(&mut self) -> io::Result<()> {
        self.ask("\nPress Enter to close this window...")?;
        Ok(())
    }
}
