//! Newtype IDs for type-safe identification of dataset elements.
//!
//! `ClassId` is the 0-based index used by YOLO label files; `CategoryId` is
//! the 1-based id written to COCO output. Keeping them distinct means the
//! `+ 1` shift happens in exactly one place ([`ClassId::category_id`]).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            #[inline]
            pub fn new(id: $inner) -> Self {
                Self(id)
            }

            #[inline]
            pub fn get(&self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an image within one split (1-based, sequential).
    ImageId(u64)
);

define_id!(
    /// Identifier of an annotation within one split (1-based, sequential).
    AnnotationId(u64)
);

define_id!(
    /// COCO category identifier (1-based).
    CategoryId(u64)
);

define_id!(
    /// YOLO class index as written in label files.
    ///
    /// Signed so that a `-1` in a label file parses and is later rejected as
    /// out of range instead of being mistaken for a malformed line.
    ClassId(i64)
);

impl ClassId {
    /// COCO category id for this class (`class_id + 1`).
    #[inline]
    pub fn category_id(&self) -> CategoryId {
        CategoryId((self.0 + 1) as u64)
    }

    /// Returns the class index if it addresses one of `num_classes` classes.
    #[inline]
    pub fn index_within(&self, num_classes: usize) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|idx| *idx < num_classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_ordering() {
        assert!(ImageId(1) < ImageId(2));
        assert!(CategoryId(10) > CategoryId(5));
    }

    #[test]
    fn test_debug_names_the_type() {
        assert_eq!(format!("{:?}", AnnotationId(7)), "AnnotationId(7)");
        assert_eq!(format!("{}", ImageId(3)), "3");
    }

    #[test]
    fn class_id_maps_to_one_based_category() {
        assert_eq!(ClassId(0).category_id(), CategoryId(1));
        assert_eq!(ClassId(4).category_id(), CategoryId(5));
    }

    #[test]
    fn class_id_range_check() {
        assert_eq!(ClassId(0).index_within(3), Some(0));
        assert_eq!(ClassId(2).index_within(3), Some(2));
        assert_eq!(ClassId(3).index_within(3), None);
        assert_eq!(ClassId(-1).index_within(3), None);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&ImageId(12)).unwrap();
        assert_eq!(json, "12");
    }
}
