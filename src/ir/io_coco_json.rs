//! COCO JSON reader and writer for [`OutputDataset`].
//!
//! COCO bounding boxes use `[x, y, width, height]` where `(x, y)` is the
//! top-left corner in absolute pixel coordinates.
//!
//! # Deterministic Output
//!
//! The writer emits images, annotations and categories in the order they
//! were recorded, which for converted splits is ascending id order. Output
//! is pretty-printed with two-space indentation.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::OutputDataset;
use crate::error::Yolo2CocoError;

/// Reads a COCO JSON file.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use yolo2coco::ir::io_coco_json::read_coco_json;
///
/// let dataset = read_coco_json(Path::new("instances_train.json"))?;
/// # Ok::<(), yolo2coco::Yolo2CocoError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<OutputDataset, Yolo2CocoError> {
    let file = File::open(path).map_err(Yolo2CocoError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| Yolo2CocoError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a dataset as pretty-printed COCO JSON.
pub fn write_coco_json(path: &Path, dataset: &OutputDataset) -> Result<(), Yolo2CocoError> {
    let file = File::create(path).map_err(Yolo2CocoError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, dataset).map_err(|source| {
        Yolo2CocoError::CocoJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;

    writer.flush().map_err(Yolo2CocoError::Io)
}

/// Parses COCO JSON from a string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<OutputDataset, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses COCO JSON from raw bytes.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation overhead.
pub fn from_coco_slice(bytes: &[u8]) -> Result<OutputDataset, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serializes a dataset to a pretty-printed COCO JSON string.
pub fn to_coco_string(dataset: &OutputDataset) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(dataset)
}
