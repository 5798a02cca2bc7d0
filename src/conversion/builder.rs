//! Per-split accumulator for converted records.
//!
//! A builder is created fresh for each split and consumed by
//! [`DatasetBuilder::finalize`]; image and annotation ids are assigned from
//! its own counters, so the two splits never influence each other's ids.

use log::warn;

use super::report::{ConversionIssue, ConversionIssueCode, SplitSummary};
use crate::ir::{
    AnnotationId, AnnotationRecord, CategoryRecord, ClassId, ImageId, ImageRecord, NormalizedBox,
    OutputDataset,
};

/// Accumulates one split's images and annotations.
#[derive(Debug)]
pub struct DatasetBuilder {
    split: String,
    num_classes: usize,
    next_image_id: u64,
    next_annotation_id: u64,
    images: Vec<ImageRecord>,
    annotations: Vec<AnnotationRecord>,
    dropped_annotations: usize,
    out_of_range_boxes: usize,
    issues: Vec<ConversionIssue>,
}

/// Everything a finished builder hands back.
#[derive(Clone, Debug)]
pub struct BuiltSplit {
    pub dataset: OutputDataset,
    pub summary: SplitSummary,
    pub issues: Vec<ConversionIssue>,
}

impl DatasetBuilder {
    pub fn new(split: impl Into<String>, num_classes: usize) -> Self {
        Self {
            split: split.into(),
            num_classes,
            next_image_id: 1,
            next_annotation_id: 1,
            images: Vec::new(),
            annotations: Vec::new(),
            dropped_annotations: 0,
            out_of_range_boxes: 0,
            issues: Vec::new(),
        }
    }

    /// Records an image and returns its id.
    pub fn add_image(&mut self, file_name: impl Into<String>, width: u32, height: u32) -> ImageId {
        let id = ImageId::new(self.next_image_id);
        self.images.push(ImageRecord::new(id, file_name, width, height));
        self.next_image_id += 1;
        id
    }

    /// Converts and records one annotation.
    ///
    /// Returns `None` without touching any counter when `class_id` is not a
    /// valid class; the drop is logged and kept as a report issue.
    pub fn add_annotation(
        &mut self,
        image_id: ImageId,
        class_id: ClassId,
        bbox: NormalizedBox,
        image_width: u32,
        image_height: u32,
    ) -> Option<AnnotationId> {
        if class_id.index_within(self.num_classes).is_none() {
            let message = format!(
                "invalid class_id {} on image '{}' ({} split, {} classes); annotation skipped",
                class_id,
                self.file_name_of(image_id),
                self.split,
                self.num_classes
            );
            warn!("{message}");
            self.issues.push(ConversionIssue::warning(
                ConversionIssueCode::InvalidClassId,
                message,
            ));
            self.dropped_annotations += 1;
            return None;
        }

        if !bbox.is_within_unit_range() {
            self.out_of_range_boxes += 1;
        }

        let id = AnnotationId::new(self.next_annotation_id);
        let abs = bbox.to_absolute(image_width, image_height);
        self.annotations.push(AnnotationRecord::new(
            id,
            image_id,
            class_id.category_id(),
            abs,
        ));
        self.next_annotation_id += 1;
        Some(id)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Consumes the builder and produces the split's dataset and summary.
    pub fn finalize(mut self, categories: Vec<CategoryRecord>) -> BuiltSplit {
        if self.out_of_range_boxes > 0 {
            self.issues.push(ConversionIssue::info(
                ConversionIssueCode::CoordinateOutOfRange,
                format!(
                    "{} annotation(s) in the {} split had normalized coordinates outside [0, 1] and were clamped",
                    self.out_of_range_boxes, self.split
                ),
            ));
        }

        let summary = SplitSummary {
            split: self.split,
            images: self.images.len(),
            annotations: self.annotations.len(),
            dropped_annotations: self.dropped_annotations,
            out_of_range_boxes: self.out_of_range_boxes,
            annotation_file: Default::default(),
        };

        BuiltSplit {
            dataset: OutputDataset {
                images: self.images,
                annotations: self.annotations,
                categories,
            },
            summary,
            issues: self.issues,
        }
    }

    fn file_name_of(&self, image_id: ImageId) -> &str {
        // Ids are 1-based positions into `images`.
        usize::try_from(image_id.get())
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.images.get(idx))
            .map(|img| img.file_name.as_str())
            .unwrap_or("<unknown>")
    }
}
