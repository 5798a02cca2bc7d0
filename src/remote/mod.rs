//! Object-storage mirroring.
//!
//! Mirrors every object under `scheme://bucket[/prefix]` into a local
//! directory, preserving the key hierarchy below the prefix. Downloads run
//! on a fixed-size worker pool; each one writes only its own destination
//! file, so completion order does not matter.

#[cfg(feature = "remote")]
pub mod gcs;
pub mod local;

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};
use rayon::prelude::*;

use crate::error::Yolo2CocoError;
use crate::progress::create_progress_bar;

pub use local::LocalStore;

/// Default number of concurrent downloads.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// A parsed `scheme://bucket[/prefix]` reference.
///
/// `prefix` is either empty or ends with `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageLocator {
    pub scheme: String,
    pub bucket: String,
    pub prefix: String,
}

impl StorageLocator {
    pub fn parse(input: &str) -> Result<Self, Yolo2CocoError> {
        let invalid = |message: &str| Yolo2CocoError::InvalidLocator {
            input: input.to_string(),
            message: message.to_string(),
        };

        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| invalid("expected scheme://bucket[/prefix]"))?;

        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("scheme must be non-empty and alphanumeric"));
        }

        let (bucket, raw_prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid("bucket name is empty"));
        }

        // `gs://bucket/dir/*` is a common shell-glob spelling of `gs://bucket/dir/`.
        let mut prefix = if raw_prefix == "*" {
            String::new()
        } else {
            raw_prefix
                .strip_suffix("/*")
                .unwrap_or(raw_prefix)
                .to_string()
        };
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            bucket: bucket.to_string(),
            prefix,
        })
    }

    /// Key relative to the prefix, or `None` if the key is outside it.
    pub fn relative_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())
    }
}

impl FromStr for StorageLocator {
    type Err = Yolo2CocoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StorageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.prefix)
    }
}

/// An object returned by a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: String,
    pub size: Option<u64>,
}

/// A source of objects grouped by bucket.
///
/// Implementations must be shareable across the download workers.
pub trait ObjectStore: Send + Sync {
    /// Lists every object whose key starts with `prefix`.
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<RemoteObject>, Yolo2CocoError>;

    /// Writes the object's bytes to `dest`. The parent directory exists.
    fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), Yolo2CocoError>;
}

/// Opens the store that serves `locator.scheme`.
///
/// `gs` requires the `remote` feature; `file` maps buckets to directories
/// under the filesystem root.
pub fn open_store(
    locator: &StorageLocator,
    token: Option<&str>,
) -> Result<Box<dyn ObjectStore>, Yolo2CocoError> {
    match locator.scheme.as_str() {
        #[cfg(feature = "remote")]
        "gs" => Ok(Box::new(gcs::GcsStore::new(token.map(str::to_string)))),
        "file" => {
            let _ = token;
            Ok(Box::new(LocalStore::new("/")))
        }
        other => Err(Yolo2CocoError::UnsupportedScheme(other.to_string())),
    }
}

#[derive(Clone, Debug)]
pub struct DownloadOptions {
    pub dest: PathBuf,
    pub max_workers: usize,
    pub show_progress: bool,
}

impl DownloadOptions {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            max_workers: DEFAULT_MAX_WORKERS,
            show_progress: false,
        }
    }
}

/// Outcome of a mirror run, in listing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub listed: usize,
    pub downloaded: Vec<PathBuf>,
    /// Directory markers and keys equal to the prefix.
    pub skipped: usize,
    /// `(key, error message)` for each failed download.
    pub failed: Vec<(String, String)>,
}

enum Outcome {
    Downloaded(PathBuf),
    Skipped,
    Failed(String, String),
}

/// Mirrors the locator's prefix into `opts.dest`.
///
/// Individual download failures are collected in the summary rather than
/// aborting the other downloads. Listing failures are returned as errors.
pub fn mirror_prefix(
    store: &dyn ObjectStore,
    locator: &StorageLocator,
    opts: &DownloadOptions,
) -> Result<DownloadSummary, Yolo2CocoError> {
    info!(
        "Bucket: {}, Prefix: {}",
        locator.bucket,
        if locator.prefix.is_empty() {
            "(root)"
        } else {
            locator.prefix.as_str()
        }
    );

    let objects = store.list(&locator.bucket, &locator.prefix)?;
    if objects.is_empty() {
        warn!("No objects found at {}", locator);
        return Ok(DownloadSummary::default());
    }
    info!("Found {} objects to download", objects.len());

    fs::create_dir_all(&opts.dest).map_err(Yolo2CocoError::Io)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.max_workers.max(1))
        .build()
        .map_err(|source| Yolo2CocoError::WorkerPool(source.to_string()))?;

    let pb = create_progress_bar(objects.len() as u64, "Downloading files", opts.show_progress);

    let outcomes: Vec<Outcome> = pool.install(|| {
        objects
            .par_iter()
            .map(|object| {
                let outcome = download_one(store, locator, &opts.dest, object);
                pb.inc(1);
                outcome
            })
            .collect()
    });
    pb.finish_and_clear();

    let mut summary = DownloadSummary {
        listed: objects.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Downloaded(path) => summary.downloaded.push(path),
            Outcome::Skipped => summary.skipped += 1,
            Outcome::Failed(key, message) => {
                warn!("Error downloading {}: {}", key, message);
                summary.failed.push((key, message));
            }
        }
    }

    Ok(summary)
}

fn download_one(
    store: &dyn ObjectStore,
    locator: &StorageLocator,
    dest_root: &Path,
    object: &RemoteObject,
) -> Outcome {
    let Some(relative) = locator.relative_key(&object.key) else {
        return Outcome::Failed(object.key.clone(), "key is outside the prefix".to_string());
    };

    if relative.is_empty() || relative.ends_with('/') {
        return Outcome::Skipped;
    }

    let Some(local_path) = local_path_for(dest_root, relative) else {
        return Outcome::Failed(
            object.key.clone(),
            "key would escape the destination directory".to_string(),
        );
    };

    if let Some(parent) = local_path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            return Outcome::Failed(object.key.clone(), err.to_string());
        }
    }

    match store.download(&locator.bucket, &object.key, &local_path) {
        Ok(()) => Outcome::Downloaded(local_path),
        Err(err) => Outcome::Failed(object.key.clone(), err.to_string()),
    }
}

/// Joins a `/`-separated relative key under `root`, refusing `..` and
/// absolute components.
pub fn local_path_for(root: &Path, relative_key: &str) -> Option<PathBuf> {
    let relative = Path::new(relative_key);
    let safe = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

    safe.then(|| root.join(relative))
}
