use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use dupfinder_core::{
    Config, DuplicateFinder, DuplicateReport, HashAlgorithm, HashProgress, ImageDetails, LogLevel,
    MatchResult,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "dupfinder")]
#[command(about = "Find visually similar images with perceptual hashes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find near-duplicate images within one directory
    Scan {
        /// Directory to scan
        directory: PathBuf,

        /// Report every matching pair under both images
        #[arg(long)]
        full_match: bool,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Find images in TARGET that resemble images in SOURCE
    Compare {
        /// Directory holding the reference images
        source: PathBuf,

        /// Directory searched for copies
        target: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "dupfinder.json")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Hash algorithm: phash, dhash or whash
    #[arg(short, long)]
    algorithm: Option<HashAlgorithm>,

    /// Fingerprint edge length (fingerprints hold hash_size^2 bits)
    #[arg(long)]
    hash_size: Option<u32>,

    /// Maximum Hamming distance for a match (defaults to the algorithm preset)
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Concurrency unit for the worker pool (0 = number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Files submitted to the worker pool at once
    #[arg(long)]
    batch_size: Option<usize>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write a rotating log file into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl SearchArgs {
    /// Load the configuration file, if any, and apply command line overrides
    fn to_config(&self, full_match: bool) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(hash_size) = self.hash_size {
            config.hash_size = hash_size;
        }
        if self.threshold.is_some() {
            config.threshold = self.threshold;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        config.recursive |= self.recursive;
        config.full_match |= full_match;

        if self.verbose > 0 {
            config.log_level = match self.verbose {
                1 => LogLevel::Debug,
                _ => LogLevel::Trace,
            };
        }

        config.validate()?;
        Ok(config)
    }

    fn init_logging(&self, level: LogLevel) -> anyhow::Result<()> {
        match &self.log_dir {
            Some(dir) => dupfinder_core::logging::init_logger(dir, level, false)
                .with_context(|| format!("Failed to set up logging in {}", dir.display()))?,
            None => {
                let filter = match level {
                    LogLevel::Error => "error",
                    LogLevel::Warn => "warn",
                    LogLevel::Info => "info",
                    LogLevel::Debug => "debug",
                    LogLevel::Trace => "trace",
                };
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
                    .init();
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            directory,
            full_match,
            search,
        } => {
            let config = search.to_config(full_match)?;
            search.init_logging(config.log_level)?;
            ensure_directory(&directory)?;

            let finder = DuplicateFinder::new(config)?;
            let matches = with_progress(search.json, |progress| {
                finder.scan(&directory, Some(progress))
            })?;

            print_report(&matches, search.json)
        }

        Commands::Compare {
            source,
            target,
            search,
        } => {
            let config = search.to_config(false)?;
            search.init_logging(config.log_level)?;
            ensure_directory(&source)?;
            ensure_directory(&target)?;

            let finder = DuplicateFinder::new(config)?;
            let matches = with_progress(search.json, |progress| {
                finder.compare(&source, &target, Some(progress))
            })?;

            print_report(&matches, search.json)
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

fn ensure_directory(path: &Path) -> anyhow::Result<()> {
    if !path.is_dir() {
        bail!("Directory not found: {}", path.display());
    }
    Ok(())
}

/// Run `search` while a progress bar follows the shared hashing counters.
/// The bar is hidden when `quiet` is set.
fn with_progress<F>(quiet: bool, search: F) -> anyhow::Result<MatchResult>
where
    F: FnOnce(&HashProgress) -> dupfinder_core::Result<MatchResult>,
{
    let progress = Arc::new(HashProgress::new());
    let done = Arc::new(AtomicBool::new(false));

    let progress_bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Computing image hashes...");

    let updater = spawn_progress_updater(progress_bar.clone(), progress.clone(), done.clone())?;

    let result = search(progress.as_ref());

    done.store(true, Ordering::Relaxed);
    if updater.join().is_err() {
        log::warn!("Progress updater thread panicked");
    }
    progress_bar.finish_and_clear();

    let matches = result?;
    info!(
        "Hashed {} of {} discovered images",
        progress.processed(),
        progress.discovered()
    );
    Ok(matches)
}

/// Poll the counters on a dedicated thread so drawing never slows the workers
fn spawn_progress_updater(
    progress_bar: ProgressBar,
    progress: Arc<HashProgress>,
    done: Arc<AtomicBool>,
) -> anyhow::Result<JoinHandle<()>> {
    let start = Instant::now();

    let handle = std::thread::Builder::new()
        .name("progress-updater".to_string())
        .spawn(move || {
            while !done.load(Ordering::Relaxed) {
                let current = progress.processed();
                progress_bar.set_length(progress.discovered() as u64);
                progress_bar.set_position(current as u64);

                // Calculate images per second
                let elapsed_secs = start.elapsed().as_secs_f64();
                let ips = if elapsed_secs > 0.0 {
                    current as f64 / elapsed_secs
                } else {
                    0.0
                };
                progress_bar.set_message(format!("{:.1} images/sec", ips));

                std::thread::sleep(Duration::from_millis(200));
            }

            // Final update before thread exits
            progress_bar.set_length(progress.discovered() as u64);
            progress_bar.set_position(progress.processed() as u64);
        })
        .context("Failed to create progress update thread")?;

    Ok(handle)
}

fn print_report(matches: &MatchResult, json: bool) -> anyhow::Result<()> {
    let report = DuplicateReport::from_matches(matches);

    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    if report.is_empty() {
        println!("No duplicates found");
        return Ok(());
    }

    for (i, row) in report.rows().iter().enumerate() {
        println!(
            "{:>4}  {:>4}  {}  <->  {}",
            i + 1,
            row.similarity_percent(),
            describe(&row.base),
            describe(&row.matched)
        );
    }
    println!("{} matching pairs", report.len());
    Ok(())
}

/// Path followed by resolution and size, or the bare path if the header is unreadable
fn describe(path: &Path) -> String {
    match ImageDetails::read(path) {
        Ok(details) => format!(
            "{} ({}, {})",
            path.display(),
            details.resolution(),
            details.human_size()
        ),
        Err(_) => path.display().to_string(),
    }
}
