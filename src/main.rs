use anyhow::{Context, Result, bail};
use clap::{ArgAction, CommandFactory, Parser};
use log::{debug, info, warn};
use mer::interactive::Prompter;
use mer::query::QueryChain;
use mer::scan::{MapTarget, Scanner};
use mer::utils::progress::{self, ProgressBar};
use mer::utils::{AppConfig, interrupt};
use mer::{output, steam};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mer", version)]
#[command(about = "Multi Entity Report: search entities in GoldSrc .bsp maps")]
#[command(after_help = "\
Terms are mod names (e.g. cstrike) or key=value queries. Queries are
implicitly or-chained; put AND between two queries to and-chain them.
Use == for exact matches, != for non-matching, </>/<=/>= for numeric
comparisons and key[N] to query the N-th space-separated element.

Example:
  mer valve classname=monster_gman AND =argument")]
struct Cli {
    /// Mod names and search queries; run without queries for interactive mode
    terms: Vec<String>,

    /// Steam install directory
    #[arg(short, long = "steamdir", value_name = "DIR")]
    steam_dir: Option<PathBuf>,

    /// Scan these .bsp files or directories instead of a Steam install
    #[arg(short, long, value_name = "PATH")]
    path: Vec<PathBuf>,

    /// Match mod names case sensitively
    #[arg(short, long)]
    case: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Scan map files in parallel
    #[arg(long)]
    parallel: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// More logging (-v warnings, -vv info, -vvv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("{:#}, using defaults", e);
        AppConfig::default()
    });

    let (mut chain, words) = QueryChain::from_terms(&cli.terms);
    let mut mods: Vec<String> = words.iter().map(|w| steam::normalize_mod(w, cli.case)).collect();

    let interactive = chain.is_empty();
    let mut prompter = Prompter::stdio();

    if interactive {
        if mods.is_empty() && cli.path.is_empty() {
            mods = prompter
                .ask_mods()?
                .iter()
                .map(|m| steam::normalize_mod(m, cli.case))
                .collect();
        }
        prompter.ask_queries(&mut chain)?;

        if chain.is_empty() {
            println!("Please specify a search query\n");
            Cli::command().print_help()?;
            prompter.wait_for_enter()?;
            return Ok(());
        }
    }

    info!("{} queries, {} mods", chain.len(), mods.len());
    for (i, query) in chain.queries().iter().enumerate() {
        debug!("query {}: {} ({:?})", i, query, query.value);
    }

    let targets = if cli.path.is_empty() {
        find_steam_maps(&cli, &mut config, &mods, &mut prompter)?
    } else {
        steam::walk_paths(&cli.path)?
    };

    if targets.is_empty() {
        eprintln!("No .bsp files were found.");
        return Ok(());
    }

    let stop = interrupt::install();
    let mut scanner = Scanner::new(&chain, stop);
    if cli.parallel || config.parallel {
        scanner = scanner.parallel(config.effective_threads());
    }
    if !cli.json {
        scanner = scanner.with_progress(spinner(targets.len()));
    }
    let summary = scanner.run(&targets);
    interrupt::restore();

    if cli.json {
        output::print_json(&summary).context("Failed to write JSON report")?;
    } else {
        output::print_report(&summary, !cli.no_color)?;
    }

    if interactive {
        prompter.wait_for_enter()?;
    }
    Ok(())
}

fn spinner(total: usize) -> ProgressBar {
    if io::stderr().is_terminal() {
        progress::scan_spinner(total)
    } else {
        progress::hidden()
    }
}

/// Resolve the Steam directory and collect the maps of `mods`.
///
/// Prompts for a directory when none is known, or when the known one holds
/// no maps, as long as stdin is a terminal.
fn find_steam_maps<R, W>(
    cli: &Cli,
    config: &mut AppConfig,
    mods: &[String],
    prompter: &mut Prompter<R, W>,
) -> Result<Vec<MapTarget>>
where
    R: io::BufRead,
    W: io::Write,
{
    if let Some(dir) = &cli.steam_dir {
        if !dir.is_dir() {
            bail!("{} was not a directory", dir.display());
        }
    }
    let can_prompt = io::stdin().is_terminal();

    let steam_dir = match steam::resolve_steam_dir(cli.steam_dir.as_deref(), config) {
        Some(dir) => dir,
        None if can_prompt => ask_steam_dir(config, prompter)?,
        None => bail!("Could not find a Steam directory, use --steamdir or --path"),
    };
    if cli.steam_dir.is_none() && config.steam_dir.as_deref() != Some(steam_dir.as_path()) {
        remember_steam_dir(config, &steam_dir);
    }

    let maps = steam::find_maps(&steam::common_dir(&steam_dir), mods)?;
    if !maps.is_empty() || !can_prompt {
        return Ok(maps);
    }

    let question = format!(
        "No .bsp files were found.\nIs '{}' your Steam install directory? (y/N) ",
        steam_dir.display()
    );
    if prompter.confirm(&question, false)? {
        return Ok(maps);
    }
    let steam_dir = ask_steam_dir(config, prompter)?;
    steam::find_maps(&steam::common_dir(&steam_dir), mods)
}

/// Ask for a Steam directory and remember it.
fn ask_steam_dir<R, W>(config: &mut AppConfig, prompter: &mut Prompter<R, W>) -> Result<PathBuf>
where
    R: io::BufRead,
    W: io::Write,
{
    let Some(dir) = prompter.ask_steam_dir()? else {
        bail!("Could not set Steam directory");
    };
    remember_steam_dir(config, &dir);
    Ok(dir)
}

fn remember_steam_dir(config: &mut AppConfig, dir: &Path) {
    config.steam_dir = Some(dir.to_path_buf());
    if let Err(e) = config.save() {
        warn!("{:#}", e);
    }
}
