//! Ordered class-name list (`label_list.txt` / `classes.txt`).

use std::fs;
use std::path::Path;

use super::ids::ClassId;
use super::model::CategoryRecord;
use crate::error::Yolo2CocoError;

/// The ordered category names; position `i` is YOLO class `i`.
///
/// Always non-empty and free of blank entries once loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassList {
    names: Vec<String>,
}

impl ClassList {
    /// Reads one name per line, trimming whitespace and skipping blank lines.
    pub fn load(path: &Path) -> Result<Self, Yolo2CocoError> {
        let data = fs::read_to_string(path).map_err(|source| Yolo2CocoError::Config {
            path: path.to_path_buf(),
            message: format!("cannot read class list: {source}"),
        })?;

        Self::from_lines(&data).ok_or_else(|| Yolo2CocoError::Config {
            path: path.to_path_buf(),
            message: "class list contains no category names".to_string(),
        })
    }

    /// Builds a list from newline-separated names; `None` if no names remain.
    pub fn from_lines(data: &str) -> Option<Self> {
        let names: Vec<String> = data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            None
        } else {
            Some(Self { names })
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a loaded list; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, class_id: ClassId) -> bool {
        class_id.index_within(self.names.len()).is_some()
    }

    pub fn name(&self, class_id: ClassId) -> Option<&str> {
        class_id
            .index_within(self.names.len())
            .map(|idx| self.names[idx].as_str())
    }

    /// COCO categories, one per class, with `id = class_id + 1`.
    pub fn categories(&self) -> Vec<CategoryRecord> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| CategoryRecord::new(ClassId(idx as i64).category_id(), name.clone()))
            .collect()
    }
}
