// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use bluelabel::config::{format_duration, parse_byte_size, parse_duration};
use bluelabel::{LabelFile, LabelerSetting};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(duration) = parse_duration(text) {
        let again = parse_duration(&format_duration(duration)).expect("formatted duration parses");
        assert_eq!(duration, again);
    }

    let _ = parse_byte_size(text);

    if let Ok(settings) = serde_json::from_str::<LabelerSetting>(text) {
        let _ = settings.validate();
        let file = LabelFile::new(text, 0);
        let _ = bluelabel::resolver::target_path(&file, &settings);
    }
});
