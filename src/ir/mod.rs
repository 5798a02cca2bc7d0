//! Dataset types shared by the YOLO reader, the conversion pipeline, and the
//! COCO writer.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: 0-based YOLO class indices ([`ClassId`]) and 1-based
//!    COCO category ids ([`CategoryId`]) are distinct newtypes.
//!
//! 2. **Two geometries, two types**: [`NormalizedBox`] is center-anchored and
//!    relative; [`AbsoluteBox`] is top-left anchored and in pixels. The only
//!    way from one to the other is the clamping conversion.
//!
//! 3. **Permissive Input**: normalized values outside `[0, 1]` are
//!    representable; clamping absorbs them instead of rejecting them.
//!
//! # Example
//!
//! ```
//! use yolo2coco::ir::{AnnotationRecord, ClassId, NormalizedBox};
//!
//! let bbox = NormalizedBox::new(0.5, 0.5, 0.2, 0.2).to_absolute(100, 100);
//! let ann = AnnotationRecord::new(1u64, 1u64, ClassId(0).category_id(), bbox);
//! assert_eq!(ann.area, 400.0);
//! ```

mod bbox;
mod classes;
mod ids;
pub mod io_coco_json;
pub mod io_yolo;
mod model;

pub use bbox::{AbsoluteBox, NormalizedBox};
pub use classes::ClassList;
pub use ids::{AnnotationId, CategoryId, ClassId, ImageId};
pub use model::{AnnotationRecord, CategoryRecord, ImageRecord, OutputDataset};
