//! yolo2coco: YOLO detection datasets to COCO, plus the plumbing around a
//! training run.
//!
//! The core is a deterministic converter: it reads a flat directory of
//! images and per-image YOLO label files, splits the images into train and
//! validation sets with a seeded shuffle, and writes one COCO instances file
//! per split next to copies of the images. Two supporting commands mirror a
//! dataset from object storage and submit a containerised training job.
//!
//! # Modules
//!
//! - [`ir`]: Dataset types, box geometry, and the YOLO/COCO readers and writers
//! - [`split`]: Seeded train/val partitioning
//! - [`conversion`]: The conversion pipeline and its report
//! - [`remote`]: Object-storage mirroring
//! - [`training`]: Training job configuration and submission
//! - [`error`]: Error types for yolo2coco operations

pub mod conversion;
pub mod error;
pub mod ir;
pub mod progress;
pub mod remote;
pub mod split;
pub mod training;

#[cfg(all(test, feature = "remote"))]
mod test_server;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

pub use error::Yolo2CocoError;

use conversion::ConvertOptions;
use remote::{DownloadOptions, StorageLocator};
use training::{CustomJobRequest, DryRunSubmitter, JobConfig, JobSubmitter, TrainingOverrides};

/// Number of failed keys listed before the rest are summarised.
const MAX_LISTED_FAILURES: usize = 5;

/// The yolo2coco CLI application.
#[derive(Parser)]
#[command(name = "yolo2coco")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a YOLO dataset into train/val COCO datasets.
    Convert(ConvertArgs),
    /// Mirror a dataset prefix from object storage into a local directory.
    Download(DownloadArgs),
    /// Submit a training job described by a YAML config.
    Submit(SubmitArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Directory containing the images (jpg, jpeg, png).
    #[arg(long)]
    images_dir: PathBuf,

    /// Directory containing one YOLO .txt label file per image.
    #[arg(long)]
    labels_dir: PathBuf,

    /// Class name file, one name per line, in class-id order.
    #[arg(long)]
    label_list: PathBuf,

    /// Output directory for the train/ and val/ trees.
    #[arg(long)]
    output_dir: PathBuf,

    /// Fraction of images assigned to the training split.
    #[arg(long, default_value_t = split::DEFAULT_TRAIN_RATIO)]
    train_ratio: f64,

    /// Seed for the train/val shuffle.
    #[arg(long, default_value_t = split::DEFAULT_SEED)]
    seed: u64,

    /// Disable progress bars.
    #[arg(long)]
    no_progress: bool,

    /// Output format for the conversion report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Arguments for the download subcommand.
#[derive(clap::Args)]
struct DownloadArgs {
    /// Source as scheme://bucket[/prefix] (schemes: gs, file).
    #[arg(env = "GCS_DATA_PATH")]
    locator: Option<String>,

    /// Local destination directory.
    #[arg(long, default_value = "data")]
    dest: PathBuf,

    /// Maximum number of concurrent downloads.
    #[arg(long, default_value_t = remote::DEFAULT_MAX_WORKERS)]
    max_workers: usize,

    /// Bearer token for the storage API.
    #[arg(long, env = "GCS_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Disable progress bars.
    #[arg(long)]
    no_progress: bool,
}

/// Arguments for the submit subcommand.
#[derive(clap::Args)]
struct SubmitArgs {
    /// Job configuration file.
    #[arg(long, default_value = training::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Number of epochs to train.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    epochs: Option<u32>,

    /// Total training batch size.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    batch_size: Option<u32>,

    /// Checkpoint frequency, in epochs.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    checkpoint_freq: Option<u32>,

    /// Run evaluation only.
    #[arg(long)]
    test_only: bool,

    /// Print the job request instead of submitting it.
    #[arg(long)]
    dry_run: bool,

    /// OAuth access token for the training service.
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

/// Run the yolo2coco CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), Yolo2CocoError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Download(args)) => run_download(args),
        Some(Commands::Submit(args)) => run_submit(args),
        None => {
            println!("yolo2coco {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("YOLO to COCO dataset conversion.");
            println!();
            println!("Run 'yolo2coco --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), Yolo2CocoError> {
    let mut opts = ConvertOptions::new(
        args.images_dir,
        args.labels_dir,
        args.label_list,
        args.output_dir,
    );
    opts.train_ratio = args.train_ratio;
    opts.seed = args.seed;

    let report = conversion::convert_dataset(&opts, !args.no_progress)?;

    match args.report {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(|source| {
                Yolo2CocoError::CocoJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{json}");
        }
        ReportFormat::Text => print!("{report}"),
    }

    Ok(())
}

/// Execute the download subcommand.
fn run_download(args: DownloadArgs) -> Result<(), Yolo2CocoError> {
    let Some(raw) = args.locator.filter(|l| !l.trim().is_empty()) else {
        info!("No storage locator given and GCS_DATA_PATH is not set; skipping download");
        return Ok(());
    };

    let locator = StorageLocator::parse(raw.trim())?;
    let store = remote::open_store(&locator, args.token.as_deref())?;

    let opts = DownloadOptions {
        dest: args.dest,
        max_workers: args.max_workers,
        show_progress: !args.no_progress,
    };

    info!("Downloading {} to {}", locator, opts.dest.display());
    let summary = remote::mirror_prefix(store.as_ref(), &locator, &opts)?;

    if summary.listed == 0 {
        println!("No files found at {locator}");
        return Ok(());
    }

    println!("Download complete!");
    println!("  Downloaded: {}", summary.downloaded.len());
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed.len());
    println!("  Destination: {}", opts.dest.display());

    if summary.failed.is_empty() {
        return Ok(());
    }

    println!();
    println!("Failed downloads:");
    for (key, message) in summary.failed.iter().take(MAX_LISTED_FAILURES) {
        println!("  - {key}: {message}");
    }
    if summary.failed.len() > MAX_LISTED_FAILURES {
        println!("  ... and {} more", summary.failed.len() - MAX_LISTED_FAILURES);
    }

    Err(Yolo2CocoError::DownloadsFailed {
        failed: summary.failed.len(),
        total: summary.listed,
    })
}

/// Execute the submit subcommand.
fn run_submit(args: SubmitArgs) -> Result<(), Yolo2CocoError> {
    let config = load_job_config(&args.config)?;

    let overrides = TrainingOverrides {
        epochs: args.epochs,
        batch_size: args.batch_size,
        checkpoint_freq: args.checkpoint_freq,
        test_only: args.test_only,
    };
    let request = CustomJobRequest::build(&config, &overrides);

    println!("Starting job: {}", request.display_name);
    println!("Container image: {}", config.container_image_uri);
    println!("Machine type: {}", config.machine_type);
    println!(
        "GPU: {} x {}",
        config.accelerator_type, config.accelerator_count
    );
    println!("Training args: {}", request.args().join(" "));
    if config.wandb_api_key.is_some() {
        println!("WandB API key configured");
    }

    let handle = if args.dry_run {
        println!();
        println!("{}", request.to_json_pretty()?);
        DryRunSubmitter.submit(&config, &request)?
    } else {
        live_submitter(args.token)?.submit(&config, &request)?
    };

    println!();
    println!(
        "{}",
        if args.dry_run {
            "Dry run: job not submitted"
        } else {
            "Job submitted successfully!"
        }
    );
    println!("  Job name: {}", handle.name);
    println!("  Display name: {}", handle.display_name);
    println!("  State: {}", handle.state);
    println!();
    println!("Monitor progress at:");
    println!("  {}", training::console_url(&config.project_id));

    Ok(())
}

fn load_job_config(path: &Path) -> Result<JobConfig, Yolo2CocoError> {
    let mut config = JobConfig::load(path)?;
    config.apply_env_overrides(|name| std::env::var(name).ok());
    config.validate(path)?;
    Ok(config)
}

#[cfg(feature = "remote")]
fn live_submitter(token: Option<String>) -> Result<Box<dyn JobSubmitter>, Yolo2CocoError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Yolo2CocoError::JobSubmit {
            message: format!(
                "no access token: pass --token or set {}",
                training::vertex::TOKEN_ENV
            ),
        })?;
    Ok(Box::new(training::vertex::VertexAiSubmitter::new(token)))
}

#[cfg(not(feature = "remote"))]
fn live_submitter(_token: Option<String>) -> Result<Box<dyn JobSubmitter>, Yolo2CocoError> {
    Err(Yolo2CocoError::JobSubmit {
        message: "this build has no remote support; rebuild with the `remote` feature or use --dry-run"
            .to_string(),
    })
}
