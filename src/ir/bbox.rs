//! Bounding box types for the two geometries this crate deals with.
//!
//! YOLO label files carry [`NormalizedBox`]es (center-anchored, fractions of
//! the image size); COCO output carries [`AbsoluteBox`]es (top-left anchored,
//! pixel units).

use serde::{Deserialize, Serialize};

/// A center-form box in normalized coordinates: `(cx, cy, w, h)`.
///
/// No range checks are applied on construction; values outside `[0, 1]` are
/// representable and get absorbed by the clamping in [`to_absolute`](Self::to_absolute).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedBox {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedBox {
    #[inline]
    pub fn new(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { cx, cy, w, h }
    }

    /// Returns true if every component lies in the nominal `[0, 1]` range.
    pub fn is_within_unit_range(&self) -> bool {
        [self.cx, self.cy, self.w, self.h]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }

    /// Converts to a pixel-space, top-left anchored box clamped to the image.
    ///
    /// The top-left corner is clamped to `[0, dim - 1]` first, then the extent
    /// is shrunk so the box never crosses the right or bottom edge. Degenerate
    /// results (zero or negative extent) are returned as-is.
    pub fn to_absolute(&self, image_width: u32, image_height: u32) -> AbsoluteBox {
        let img_w = image_width as f64;
        let img_h = image_height as f64;

        let cx_abs = self.cx * img_w;
        let cy_abs = self.cy * img_h;
        let mut w_abs = self.w * img_w;
        let mut h_abs = self.h * img_h;

        let mut x = cx_abs - w_abs / 2.0;
        let mut y = cy_abs - h_abs / 2.0;

        x = x.min(img_w - 1.0).max(0.0);
        y = y.min(img_h - 1.0).max(0.0);
        w_abs = w_abs.min(img_w - x);
        h_abs = h_abs.min(img_h - y);

        AbsoluteBox::new(x, y, w_abs, h_abs)
    }
}

/// A top-left anchored box in pixel units: `(x, y, w, h)`.
///
/// Serializes as the COCO `[x, y, width, height]` array.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbsoluteBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl AbsoluteBox {
    #[inline]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the area of the box. May be zero or negative for degenerate boxes.
    #[inline]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Returns true if the box lies entirely inside a `width` x `height` image.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.w <= image_width as f64
            && self.y + self.h <= image_height as f64
    }

    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

impl Serialize for AbsoluteBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AbsoluteBox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y, w, h] = <[f64; 4]>::deserialize(deserializer)?;
        Ok(AbsoluteBox::new(x, y, w, h))
    }
}
