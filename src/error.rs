use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yolo2coco operations.
///
/// Only fatal conditions live here. Per-annotation problems (unknown class
/// ids, short label lines, missing label files) are recovered where they
/// occur and surface through [`ConversionReport`](crate::conversion::ConversionReport).
#[derive(Debug, Error)]
pub enum Yolo2CocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to read image dimensions from {path}: {message}")]
    ImageProbe { path: PathBuf, message: String },

    #[error("Invalid train ratio {ratio}: must be strictly between 0 and 1")]
    InvalidSplitRatio { ratio: f64 },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid storage locator '{input}': {message}")]
    InvalidLocator { input: String, message: String },

    #[error("Unsupported storage scheme '{0}' (supported: gs, file)")]
    UnsupportedScheme(String),

    #[error("Download of '{key}' failed: {message}")]
    Download { key: String, message: String },

    #[error("{failed} of {total} download(s) failed")]
    DownloadsFailed { failed: usize, total: usize },

    #[error("Training job submission failed: {message}")]
    JobSubmit { message: String },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}
