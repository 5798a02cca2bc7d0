//! Fuzz target for single YOLO label lines.
//!
//! Any line must either parse or be rejected without panicking, and a
//! parsed box must still clamp into the image.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo2coco::ir::io_yolo::fuzz_parse_label_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(ann) = fuzz_parse_label_line(line) {
        let abs = ann.bbox.to_absolute(640, 480);
        assert!((0.0..=639.0).contains(&abs.x));
        assert!((0.0..=479.0).contains(&abs.y));
    }
});
