// SPDX-License-Identifier: Apache-2.0

use bids_sidecar_model::{SidecarDocument, ValidationReport};
use serde_json::Value;

/// Lists required fields that are absent, null, or an empty string, in the
/// order they were required. Advisory only; the document is not touched.
#[must_use]
pub fn validate<S: AsRef<str>>(document: &SidecarDocument, required: &[S]) -> ValidationReport {
    let mut missing_fields = Vec::new();
    for name in required {
        let name: &str = name.as_ref();
        if is_missing(document.get(name)) {
            missing_fields.push(name.to_string());
        }
    }
    ValidationReport { missing_fields }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
