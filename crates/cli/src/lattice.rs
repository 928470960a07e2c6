//! lattice - Reconstruct table structure from ruling lines
//!
//! Reads JSON ruling sets, one object or an array of them per file, and
//! writes the reconstructed cells, region outlines and tabularity verdicts
//! as JSON.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use lattice_core::high_level::{Reconstruction, RulingSet, reconstruct_many};
use lattice_core::table::LatticeSettings;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Reconstruct table cells and regions from ruling lines.
#[derive(Parser, Debug)]
#[command(name = "lattice")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more JSON files holding a ruling set or an array of them
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Pretty-print the JSON output
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Worker threads for batch reconstruction (default: available cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    // === Reconstruction options ===
    /// Decimal digits kept when comparing coordinates
    #[arg(long, default_value_t = LatticeSettings::default().precision)]
    precision: u32,

    /// Slack when testing whether a point lies on a ruling
    #[arg(long = "colinear-tolerance", default_value_t = LatticeSettings::default().colinear_tolerance)]
    colinear_tolerance: f64,

    /// Snap rulings this close to each other onto one position (0 = off)
    #[arg(long = "snap-tolerance", default_value_t = LatticeSettings::default().snap_tolerance)]
    snap_tolerance: f64,

    /// Join colinear rulings separated by at most this gap
    #[arg(long = "join-tolerance", default_value_t = LatticeSettings::default().join_tolerance)]
    join_tolerance: f64,

    /// Drop rulings shorter than this
    #[arg(long = "min-ruling-length", default_value_t = LatticeSettings::default().min_ruling_length)]
    min_ruling_length: f64,

    /// Tabularity threshold, strictly between 0 and 1
    #[arg(long, default_value_t = LatticeSettings::default().heuristic_threshold)]
    threshold: f64,

    /// Skip spanning cell and placeholder detection
    #[arg(long = "no-spanning", action = ArgAction::SetTrue)]
    no_spanning: bool,
}

impl Args {
    fn settings(&self) -> LatticeSettings {
        LatticeSettings {
            precision: self.precision,
            colinear_tolerance: self.colinear_tolerance,
            snap_tolerance: self.snap_tolerance,
            join_tolerance: self.join_tolerance,
            min_ruling_length: self.min_ruling_length,
            heuristic_threshold: self.threshold,
            add_spanning_cells: !self.no_spanning,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Many(Vec<RulingSet>),
    One(RulingSet),
}

impl Input {
    fn into_sets(self) -> Vec<RulingSet> {
        match self {
            Input::Many(sets) => sets,
            Input::One(set) => vec![set],
        }
    }
}

fn parse_sets(text: &str) -> serde_json::Result<Vec<RulingSet>> {
    serde_json::from_str::<Input>(text).map(Input::into_sets)
}

fn read_sets(path: &Path) -> Result<Vec<RulingSet>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let input: Input = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing ruling sets in {}", path.display()))?;
    Ok(input.into_sets())
}

fn write_results<W: Write>(writer: &mut W, results: &[Reconstruction], pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, results)?;
    } else {
        serde_json::to_writer(&mut *writer, results)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let settings = args.settings();
    settings.validate()?;

    let mut sets = Vec::new();
    for path in &args.files {
        let mut file_sets = read_sets(path)?;
        tracing::debug!(file = %path.display(), sets = file_sets.len(), "loaded ruling sets");
        sets.append(&mut file_sets);
    }

    let results = reconstruct_many(&sets, &settings, args.threads)?;
    tracing::debug!(input = sets.len(), output = results.len(), "reconstructed");

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("creating output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };
    write_results(&mut output, &results, args.pretty)?;
    output.flush()?;
    Ok(())
}
