//! Defensive decoding of pipeline response bodies
//!
//! The remote API returns loosely structured JSON (list-or-object, optional
//! nesting, counters as numbers or strings). Every counter that comes out of
//! here is a non-negative integer; anything malformed counts as 0.

use crate::error::StageError;
use crate::models::{DetectedCounts, SyncState};
use serde_json::{Map, Value};

const PROCESSED_KEY: &str = "processed_record";
const FAILED_KEY: &str = "failed_record";

/// Coerce a JSON value into a non-negative counter
pub fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn counter(object: &Map<String, Value>, key: &str) -> u64 {
    object.get(key).map(coerce_count).unwrap_or(0)
}

/// Sum step counters across all processes of a parse-trigger response
///
/// Accepted shapes:
/// - `[process, ...]`
/// - `{"processes": [process, ...]}` or `{"data": [process, ...]}`
/// - a single `process`
///
/// where `process = {"steps": [{"processed_record": n, "failed_record": m}, ...]}`.
/// A process without `steps` contributes its own counters, if any.
pub fn detected_counts_from_value(value: &Value) -> DetectedCounts {
    let processes: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("processes").or_else(|| map.get("data")) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => vec![value],
        },
        _ => Vec::new(),
    };

    let mut counts = DetectedCounts::default();
    for process in processes {
        let Value::Object(process) = process else {
            continue;
        };

        match process.get("steps") {
            Some(Value::Array(steps)) => {
                for step in steps.iter().filter_map(Value::as_object) {
                    counts.processed = counts.processed.saturating_add(counter(step, PROCESSED_KEY));
                    counts.failed = counts.failed.saturating_add(counter(step, FAILED_KEY));
                }
            }
            Some(_) => {}
            None => {
                counts.processed = counts.processed.saturating_add(counter(process, PROCESSED_KEY));
                counts.failed = counts.failed.saturating_add(counter(process, FAILED_KEY));
            }
        }
    }

    counts
}

/// Parse-trigger body to detected counts; unparseable bodies yield `(0, 0)`
pub fn parse_detected_counts(body: &str) -> DetectedCounts {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => detected_counts_from_value(&value),
        Err(e) => {
            tracing::debug!(error = %e, "Parse-trigger body is not JSON, treating as 0/0");
            DetectedCounts::default()
        }
    }
}

/// Synchronize body to counters, unwrapping a leading list element
pub fn sync_state_from_value(value: &Value) -> SyncState {
    let object = match value {
        Value::Array(items) => items.first().and_then(Value::as_object),
        Value::Object(map) => Some(map),
        _ => None,
    };

    object
        .map(|map| SyncState::new(counter(map, PROCESSED_KEY), counter(map, FAILED_KEY)))
        .unwrap_or_default()
}

pub fn parse_sync_state(body: &str) -> Result<SyncState, StageError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| StageError::Parse(e.to_string()))?;
    Ok(sync_state_from_value(&value))
}

/// Number of reconciled ids: a raw list, or a list under `data` / `steps`
pub fn reconciled_count_from_value(value: &Value) -> u64 {
    let ids = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => ["data", "steps"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array)),
        _ => None,
    };

    ids.map(|items| items.len() as u64).unwrap_or(0)
}

pub fn parse_reconciled_count(body: &str) -> Result<u64, StageError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| StageError::Parse(e.to_string()))?;
    Ok(reconciled_count_from_value(&value))
}
