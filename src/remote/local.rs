//! Directory-backed object store.
//!
//! Each bucket is a directory under the store root and each key is a
//! `/`-separated path inside it.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ObjectStore, RemoteObject};
use crate::error::Yolo2CocoError;

#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }
}

impl ObjectStore for LocalStore {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<RemoteObject>, Yolo2CocoError> {
        let bucket_dir = self.bucket_dir(bucket);
        if !bucket_dir.is_dir() {
            return Err(Yolo2CocoError::Download {
                key: bucket.to_string(),
                message: format!("bucket directory not found: {}", bucket_dir.display()),
            });
        }

        // Only the directory holding the prefix's last component needs walking.
        let walk_root = match prefix.rfind('/') {
            Some(idx) => bucket_dir.join(&prefix[..idx]),
            None => bucket_dir.clone(),
        };
        if !walk_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        for entry in WalkDir::new(&walk_root).follow_links(false) {
            let entry = entry.map_err(|err| Yolo2CocoError::Download {
                key: bucket.to_string(),
                message: err.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&bucket_dir) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if key.starts_with(prefix) {
                let size = entry.metadata().ok().map(|m| m.len());
                objects.push(RemoteObject { key, size });
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), Yolo2CocoError> {
        let source = self.bucket_dir(bucket).join(key);
        fs::copy(&source, dest).map_err(|err| Yolo2CocoError::Download {
            key: key.to_string(),
            message: err.to_string(),
        })?;
        Ok(())
    }
}
