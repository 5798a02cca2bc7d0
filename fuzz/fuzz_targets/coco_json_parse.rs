//! Fuzz target for COCO instances JSON parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse
//!
//! Or with a corpus:
//!   cargo +nightly fuzz run coco_json_parse fuzz/corpus/coco_json_parse/

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo2coco::ir::io_coco_json::{from_coco_slice, to_coco_string};

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for one split's annotation file.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(dataset) = from_coco_slice(data) {
        let _ = to_coco_string(&dataset);
    }
});
