//! Event Selection CLI Application
//!
//! This is the command-line interface for the event selection library.
//! It uses eventselect-core and adds:
//! - Subcommands for single-sample plots and signal/background comparisons
//! - TOML configuration loading
//! - Cut policy selection from command-line flags
//! - Plot rendering (SVG/PNG/JSON)

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use eventselect_core::{
    title_for, AnalysisConfig, AnalysisError, Analyzer, CutOverrides, RootDataset, SelectionMode,
};
use std::path::{Path, PathBuf};

mod config;
mod report;

use report::Plot;

/// Event Selection - Transverse mass distributions from ROOT ntuples
#[derive(Parser, Debug)]
#[command(name = "eventselect")]
#[command(
    about = "Select dilepton + MET events and plot their transverse mass",
    long_about = None
)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Name of the tree holding the event records (overrides the config file)
    #[arg(long, value_name = "NAME", global = true)]
    tree: Option<String>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plot the transverse mass distribution of one sample
    Plot {
        /// ROOT file to analyse
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Sample label shown in the plot title
        #[arg(short, long, default_value = "Sample")]
        label: String,

        /// Output image (.png, .svg or .json)
        #[arg(short, long, value_name = "FILE", default_value = "plots/transverse_mass.png")]
        output: PathBuf,

        #[command(flatten)]
        cuts: CutArgs,
    },

    /// Overlay signal and background transverse mass distributions
    Compare {
        /// Signal ROOT file
        #[arg(long, value_name = "FILE")]
        signal: PathBuf,

        /// Background ROOT file
        #[arg(long, value_name = "FILE")]
        background: PathBuf,

        /// Output image (.png, .svg or .json)
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        cuts: CutArgs,
    },
}

/// Cut policy flags shared by all subcommands
#[derive(ClapArgs, Debug, Clone, Default)]
struct CutArgs {
    /// Disable all selection cuts except the two-lepton requirement
    #[arg(long)]
    no_cuts: bool,

    /// Minimum lepton count (replaces the default cuts)
    #[arg(long = "lep-n", alias = "lep_n", value_name = "N")]
    lep_n: Option<u32>,

    /// Minimum missing transverse energy in GeV (replaces the default cuts)
    #[arg(long, value_name = "GEV")]
    met: Option<f64>,
}

impl CutArgs {
    /// Resolve the selection mode for this invocation
    fn mode(&self) -> SelectionMode {
        if self.no_cuts && (self.lep_n.is_some() || self.met.is_some()) {
            log::warn!("--no-cuts given together with cut overrides; overrides are ignored");
        }
        SelectionMode::from_overrides(
            !self.no_cuts,
            CutOverrides {
                min_lepton_count: self.lep_n,
                min_missing_et_gev: self.met,
            },
        )
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Event Selection CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using analysis library v{}", eventselect_core::VERSION);

    let config = config::resolve(args.config.as_deref(), args.tree.as_deref())?;

    let result = match &args.command {
        Command::Plot {
            file,
            label,
            output,
            cuts,
        } => plot_mode(&config, file, label, output, cuts.mode()),
        Command::Compare {
            signal,
            background,
            output,
            cuts,
        } => compare_mode(&config, signal, background, output, cuts.mode()),
    };

    if let Err(err) = &result {
        if let Some(kind) = failure_kind(err) {
            log::error!("Analysis failed ({})", kind);
        }
    }
    result
}

/// Tag of the library error behind a failure, if there is one
fn failure_kind(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AnalysisError>())
        .map(AnalysisError::kind)
}

/// Plot mode - one sample, one histogram
fn plot_mode(
    config: &AnalysisConfig,
    file: &Path,
    label: &str,
    output: &Path,
    mode: SelectionMode,
) -> Result<()> {
    log::info!("Selection: {}", mode);
    let analyzer = Analyzer::new(config.clone(), mode).context("Invalid analysis configuration")?;

    let dataset = open_dataset(file, &config.tree_name)?;
    let distribution = analyzer
        .fill_source(label, &title_for(label), &dataset)
        .with_context(|| format!("Failed to analyse {:?}", file))?;

    report::render_to_file(&Plot::single(&distribution), output)
        .with_context(|| format!("Failed to write plot: {:?}", output))?;

    println!(
        "{}: {} of {} records selected, {} entries written to {}",
        label,
        distribution.cutflow.selected,
        distribution.cutflow.records,
        distribution.histogram.entries(),
        output.display()
    );
    Ok(())
}

/// Compare mode - signal against background with the same selection
fn compare_mode(
    config: &AnalysisConfig,
    signal: &Path,
    background: &Path,
    output: &Path,
    mode: SelectionMode,
) -> Result<()> {
    log::info!("Selection: {}", mode);
    let analyzer = Analyzer::new(config.clone(), mode).context("Invalid analysis configuration")?;

    let signal_data = open_dataset(signal, &config.tree_name)?;
    let background_data = open_dataset(background, &config.tree_name)?;

    let comparison = analyzer
        .compare(&signal_data, &background_data)
        .context("Failed to build signal/background distributions")?;

    report::render_to_file(&Plot::comparison(&comparison), output)
        .with_context(|| format!("Failed to write plot: {:?}", output))?;

    for (distribution, label) in comparison.legend() {
        println!(
            "{}: {} of {} records selected, {} entries",
            label,
            distribution.cutflow.selected,
            distribution.cutflow.records,
            distribution.histogram.entries()
        );
    }
    println!("Comparison written to {}", output.display());
    Ok(())
}

fn open_dataset(path: &Path, tree_name: &str) -> Result<RootDataset> {
    RootDataset::open(path, tree_name)
        .with_context(|| format!("Failed to load records from {:?}", path))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
