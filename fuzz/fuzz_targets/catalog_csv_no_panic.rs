// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use decluster_cli::{parse_catalog_csv, run_decluster_json};
use decluster_core::ExecutionContext;
use libfuzzer_sys::fuzz_target;

const SPECS: [&str; 4] = [
    "{}",
    r#"{"window":"uhrhammer","fs_time_prop":0.5}"#,
    r#"{"window":"gruenthal","time_cutoff":30}"#,
    r#"{"window":"gk","fs_time_prop":2}"#,
];

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let spec = SPECS[common::bounded(cursor.next_u8(), 0, SPECS.len() - 1)];

    let Ok(raw) = std::str::from_utf8(cursor.remaining()) else {
        return;
    };
    let Ok(catalog) = parse_catalog_csv(raw) else {
        return;
    };
    let Ok(view) = catalog.as_view() else {
        return;
    };

    if let Ok(result) = run_decluster_json(&view, spec, &ExecutionContext::new()) {
        assert_eq!(result.cluster_ids.len(), catalog.len());
    }
});
