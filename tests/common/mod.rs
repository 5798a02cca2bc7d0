#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Signature plus IHDR chunk: enough for a header-only dimension read.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(33);
    bytes.extend_from_slice(b"\x89PNG\r\n\x1a\n");
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    // bit depth, colour type (RGB), compression, filter, interlace
    bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, png_bytes(width, height)).expect("write png file");
}

/// A YOLO dataset laid out on disk as `images/`, `labels/`, `classes.txt`.
pub struct YoloFixture {
    pub root: PathBuf,
}

impl YoloFixture {
    pub fn new(root: &Path, classes: &[&str]) -> Self {
        fs::create_dir_all(root.join("images")).expect("create images dir");
        fs::create_dir_all(root.join("labels")).expect("create labels dir");
        fs::write(root.join("classes.txt"), classes.join("\n") + "\n").expect("write classes");
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.root.join("labels")
    }

    pub fn label_list(&self) -> PathBuf {
        self.root.join("classes.txt")
    }

    /// Writes `<stem>.png` and, when `labels` is given, `<stem>.txt`.
    pub fn add_image(&self, stem: &str, width: u32, height: u32, labels: Option<&str>) {
        write_png(&self.images_dir().join(format!("{stem}.png")), width, height);
        if let Some(labels) = labels {
            fs::write(self.labels_dir().join(format!("{stem}.txt")), labels)
                .expect("write label file");
        }
    }
}
