//! YOLO-side input: image discovery and per-image label files.
//!
//! Label files hold one object per line, `class_id cx cy w h`, with the box
//! normalized to the image size. Parsing is lenient: a missing label file
//! means "no objects", and short or unparsable lines are skipped silently.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ClassId, NormalizedBox};
use crate::error::Yolo2CocoError;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
pub const LABEL_EXTENSION: &str = "txt";

/// One object instance read from a label file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloAnnotation {
    pub class_id: ClassId,
    pub bbox: NormalizedBox,
}

/// Reads a label file into annotations, in line order.
///
/// A label file that does not exist yields an empty vector. Other I/O
/// failures are returned as errors.
pub fn read_label_file(path: &Path) -> Result<Vec<YoloAnnotation>, Yolo2CocoError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(Yolo2CocoError::Io(err)),
    };

    Ok(parse_label_str(&content))
}

/// Parses label file content; see [`parse_label_line`] for per-line rules.
pub fn parse_label_str(content: &str) -> Vec<YoloAnnotation> {
    content.lines().filter_map(parse_label_line).collect()
}

/// Parses a single label line.
///
/// Returns `None` for blank lines, lines with fewer than five tokens, and
/// lines whose first five tokens do not parse. Tokens past the fifth are
/// ignored.
pub fn parse_label_line(line: &str) -> Option<YoloAnnotation> {
    // Take at most 5 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = line.split_whitespace().take(5).collect();
    if tokens.len() < 5 {
        return None;
    }

    let class_id = parse_class_id(tokens[0])?;
    let cx = tokens[1].parse::<f64>().ok()?;
    let cy = tokens[2].parse::<f64>().ok()?;
    let w = tokens[3].parse::<f64>().ok()?;
    let h = tokens[4].parse::<f64>().ok()?;
    if ![cx, cy, w, h].iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(YoloAnnotation {
        class_id: ClassId(class_id),
        bbox: NormalizedBox::new(cx, cy, w, h),
    })
}

/// Integer class ids that overflow `i64` saturate, so they stay out of
/// range and get reported instead of vanishing as malformed lines.
fn parse_class_id(token: &str) -> Option<i64> {
    if let Ok(id) = token.parse::<i64>() {
        return Some(id);
    }

    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(if negative { i64::MIN } else { i64::MAX })
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Option<YoloAnnotation> {
    parse_label_line(input)
}

/// Lists image files directly inside `dir`, sorted by file name.
///
/// Only the top level is scanned. Extensions match case-insensitively, so
/// mixed-case spellings such as `.Jpg` are picked up alongside `.jpg` and
/// `.JPG`.
pub fn collect_image_files(dir: &Path) -> Result<Vec<PathBuf>, Yolo2CocoError> {
    if !dir.is_dir() {
        return Err(Yolo2CocoError::Config {
            path: dir.to_path_buf(),
            message: "images directory does not exist or is not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| Yolo2CocoError::Config {
            path: dir.to_path_buf(),
            message: format!("failed while listing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Label path for an image: `labels_dir/<image stem>.txt`.
pub fn label_path_for_image(image_path: &Path, labels_dir: &Path) -> PathBuf {
    let mut file_name = image_path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(".");
    file_name.push(LABEL_EXTENSION);
    labels_dir.join(file_name)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}
