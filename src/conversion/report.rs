//! Conversion report types.
//!
//! The report is the run's final summary: how many images and annotations
//! were written per split, plus the recoverable problems met on the way.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Summary of a whole conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Category names in class-id order.
    pub classes: Vec<String>,
    /// Images discovered before splitting.
    pub discovered_images: usize,
    /// Per-split results, in processing order (train, then val).
    pub splits: Vec<SplitSummary>,
    /// Recoverable issues, in the order they were met.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn split(&self, name: &str) -> Option<&SplitSummary> {
        self.splits.iter().find(|s| s.split == name)
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    pub fn total_images(&self) -> usize {
        self.splits.iter().map(|s| s.images).sum()
    }

    pub fn total_annotations(&self) -> usize {
        self.splits.iter().map(|s| s.annotations).sum()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Converted {} image(s) with {} class(es)",
            self.discovered_images,
            self.classes.len()
        )?;

        for split in &self.splits {
            writeln!(
                f,
                "  {}: {} images, {} annotations ({} dropped) -> {}",
                split.split,
                split.images,
                split.annotations,
                split.dropped_annotations,
                split.annotation_file.display()
            )?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts for one split.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub split: String,
    pub images: usize,
    pub annotations: usize,
    /// Annotations skipped because their class id was out of range.
    pub dropped_annotations: usize,
    /// Annotations whose normalized box had components outside `[0, 1]`.
    pub out_of_range_boxes: usize,
    pub annotation_file: PathBuf,
}

/// A single recoverable issue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// Data was dropped.
    Warning,
    /// Data was kept but adjusted.
    Info,
}

/// Stable issue codes for programmatic consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// An annotation referenced a class id outside the class list.
    InvalidClassId,
    /// Normalized coordinates outside `[0, 1]` were clamped.
    CoordinateOutOfRange,
}
