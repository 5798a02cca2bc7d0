//! Fuzz target for whole YOLO label files.
//!
//! Run with:
//!   cargo +nightly fuzz run yolo_label_file_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo2coco::ir::io_yolo::parse_label_str;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let content = String::from_utf8_lossy(data);
    let annotations = parse_label_str(&content);
    assert!(annotations.len() <= content.lines().count());
});
