//! Annotation keys and value-shape checks
//!
//! Only three key families are inspected: keys containing `recommendation`
//! must hold a quantity, keys containing `timestamp` an RFC3339 timestamp,
//! and keys ending in `managed`/`enabled` a literal boolean. Other keys pass
//! through untouched.

use crate::quantity::{CpuQuantity, MemoryQuantity};
use std::collections::BTreeMap;
use thiserror::Error;

pub const MANAGED: &str = "resource-optimizer.io/managed";
pub const ENABLED: &str = "resource-optimizer.io/enabled";
pub const CPU_RECOMMENDATION: &str = "resource-optimizer.io/cpu-recommendation";
pub const MEMORY_RECOMMENDATION: &str = "resource-optimizer.io/memory-recommendation";
pub const LAST_UPDATE_TIMESTAMP: &str = "resource-optimizer.io/last-update-timestamp";
pub const MEMORY_DECREASE_WARNING: &str = "resource-optimizer.io/memory-decrease-warning";

/// Key suffix that marks a memory-decrease warning, with or without prefix
const MEMORY_DECREASE_WARNING_SUFFIX: &str = "memory-decrease-warning";

/// Annotation value with the wrong shape for its key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("annotation '{key}': '{value}' is not a resource quantity")]
    InvalidQuantity { key: String, value: String },

    #[error("annotation '{key}': '{value}' is not an RFC3339 timestamp")]
    InvalidTimestamp { key: String, value: String },

    #[error("annotation '{key}': '{value}' is not \"true\" or \"false\"")]
    InvalidFlag { key: String, value: String },
}

fn last_segment(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn is_flag_key(key: &str) -> bool {
    let segment = last_segment(key);
    segment.ends_with("managed") || segment.ends_with("enabled")
}

fn is_quantity(key: &str, value: &str) -> bool {
    let segment = last_segment(key);
    if segment.contains("cpu") {
        CpuQuantity::parse(value).is_ok()
    } else if segment.contains("memory") {
        MemoryQuantity::parse(value).is_ok()
    } else {
        CpuQuantity::parse(value).is_ok() || MemoryQuantity::parse(value).is_ok()
    }
}

/// Check a single annotation against its key family
pub fn validate_annotation(key: &str, value: &str) -> Result<(), AnnotationError> {
    let owned = || (key.to_string(), value.to_string());

    if key.contains("recommendation") {
        if !is_quantity(key, value) {
            let (key, value) = owned();
            return Err(AnnotationError::InvalidQuantity { key, value });
        }
    } else if key.contains("timestamp") {
        if chrono::DateTime::parse_from_rfc3339(value).is_err() {
            let (key, value) = owned();
            return Err(AnnotationError::InvalidTimestamp { key, value });
        }
    } else if is_flag_key(key) && value != "true" && value != "false" {
        let (key, value) = owned();
        return Err(AnnotationError::InvalidFlag { key, value });
    }

    Ok(())
}

/// Every malformed annotation in the map
pub fn validate_annotations(annotations: &BTreeMap<String, String>) -> Vec<AnnotationError> {
    annotations
        .iter()
        .filter_map(|(key, value)| validate_annotation(key, value).err())
        .collect()
}

pub fn has_memory_decrease_warning(annotations: &BTreeMap<String, String>) -> bool {
    annotations
        .keys()
        .any(|key| last_segment(key) == MEMORY_DECREASE_WARNING_SUFFIX)
}
