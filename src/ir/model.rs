//! COCO-shaped dataset records produced by the conversion.
//!
//! These types serialize directly to the COCO detection schema:
//!
//! ```text
//! { "images": [ {id, file_name, width, height} ],
//!   "annotations": [ {id, image_id, category_id, bbox, area, iscrowd} ],
//!   "categories": [ {id, name} ] }
//! ```

use serde::{Deserialize, Serialize};

use super::bbox::AbsoluteBox;
use super::ids::{AnnotationId, CategoryId, ImageId};

/// One split's worth of converted data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDataset {
    pub images: Vec<ImageRecord>,
    pub annotations: Vec<AnnotationRecord>,
    pub categories: Vec<CategoryRecord>,
}

/// An image entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    /// Original file name (no directory components).
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageRecord {
    pub fn new(id: impl Into<ImageId>, file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// A category entry; `id` is the 1-based class index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
}

impl CategoryRecord {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An annotation entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,
    /// COCO bbox: `[x, y, width, height]`, top-left anchored, pixels.
    pub bbox: AbsoluteBox,
    pub area: f64,
    /// Crowd regions are not produced; always 0.
    pub iscrowd: u8,
}

impl AnnotationRecord {
    /// Creates a non-crowd annotation whose area is derived from the box.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: AbsoluteBox,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            area: bbox.area(),
            bbox,
            iscrowd: 0,
        }
    }
}
