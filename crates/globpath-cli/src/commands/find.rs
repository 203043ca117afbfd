//! Find command - list paths matching globs.

use crate::OutputFormat;
use clap::Args;
use globpath_core::{Config, Issue, PathFinder, PathQuery};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Arguments for `globpath find`.
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Base directory for relative globs (default: current directory)
    pub base: Option<PathBuf>,

    /// Include glob (repeatable); none means everything under the base
    #[arg(short, long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Exclude glob (repeatable), added to the configured excludes
    #[arg(short, long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Allowed extension (repeatable, case-insensitive); replaces the configured list
    #[arg(short = 'x', long = "ext", value_name = "EXT")]
    pub ext: Vec<String>,

    /// Maximum depth below each base (negative = unlimited)
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    pub max_depth: Option<i64>,

    /// Also return directories
    #[arg(long)]
    pub dirs: bool,

    /// Do not follow symbolic links
    #[arg(long)]
    pub no_follow: bool,

    /// Skip bases that cannot be opened instead of failing
    #[arg(long)]
    pub best_effort: bool,

    /// Sort results before printing
    #[arg(long)]
    pub sort: bool,

    /// Maximum number of results to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,
}

/// What a find run produced.
#[derive(Debug, Serialize)]
pub struct FindOutcome {
    pub paths: Vec<PathBuf>,
    pub issues: Vec<Issue>,
    /// True when `--limit` cut the results short
    pub truncated: bool,
}

/// Merge configured defaults with command-line flags.
pub fn build_query(config: &Config, args: &FindArgs) -> PathQuery {
    let base = args.base.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut builder = config.query_builder(base);

    for glob in &args.include {
        builder = builder.include(glob.clone());
    }
    for glob in &args.exclude {
        builder = builder.exclude(glob.clone());
    }
    if !args.ext.is_empty() {
        builder = builder.allowed_extensions(args.ext.iter().cloned());
    }
    if let Some(depth) = args.max_depth {
        builder = builder.max_depth_signed(depth);
    }
    if args.dirs {
        builder = builder.only_files(false);
    }
    if args.no_follow {
        builder = builder.follow_links(false);
    }
    if args.best_effort {
        builder = builder.fail_fast(false);
    }

    builder.build()
}

/// Run a query and collect its results.
///
/// Without `sort`, the stream is closed as soon as `limit` paths are in hand.
/// With `sort`, every path is collected so the first `limit` are the smallest.
pub fn execute(
    finder: &PathFinder,
    query: &PathQuery,
    sort: bool,
    limit: Option<usize>,
) -> globpath_core::Result<FindOutcome> {
    let mut stream = finder.find(query)?;
    let mut paths = Vec::new();
    let mut truncated = false;

    if sort {
        paths.extend(stream.by_ref());
        paths.sort();
        if let Some(limit) = limit {
            truncated = paths.len() > limit;
            paths.truncate(limit);
        }
    } else {
        for path in stream.by_ref() {
            if limit.map_or(false, |limit| paths.len() >= limit) {
                truncated = true;
                break;
            }
            paths.push(path);
        }
    }

    stream.close();
    let issues = stream.issues();

    Ok(FindOutcome {
        paths,
        issues,
        truncated,
    })
}

/// Write the outcome in the requested format.
pub fn render(out: &mut impl Write, outcome: &FindOutcome, format: &OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for path in &outcome.paths {
                writeln!(out, "{}", path.display())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, outcome)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Run the find command.
pub fn run(config: Config, args: FindArgs) -> anyhow::Result<()> {
    let query = build_query(&config, &args);
    let finder = PathFinder::new().with_options(config.finder_options());

    let start = Instant::now();
    let outcome = execute(&finder, &query, args.sort, args.limit)?;
    let elapsed = start.elapsed();

    render(&mut io::stdout().lock(), &outcome, &args.output)?;

    if args.output == OutputFormat::Text {
        for issue in &outcome.issues {
            eprintln!("skipped: {}", issue);
        }
        eprintln!();
        eprintln!(
            "Found {} paths in {:.3}ms{}",
            outcome.paths.len(),
            elapsed.as_secs_f64() * 1000.0,
            if outcome.truncated { " (limit reached)" } else { "" }
        );
    }

    info!(
        paths = outcome.paths.len(),
        skipped = outcome.issues.len(),
        truncated = outcome.truncated,
        elapsed_ms = elapsed.as_millis() as u64,
        "Find complete"
    );

    Ok(())
}
