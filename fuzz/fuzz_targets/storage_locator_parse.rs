//! Fuzz target for `scheme://bucket[/prefix]` locators.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo2coco::remote::StorageLocator;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(locator) = StorageLocator::parse(input) {
        assert!(!locator.bucket.is_empty());
        assert!(locator.prefix.is_empty() || locator.prefix.ends_with('/'));
    }
});
