//! Deep merge against the default template
//!
//! Rule: a source value that is a JSON object is merged key by key into the
//! target (a non-object target is replaced by `{}` first). Every other source
//! value, arrays and `null` included, replaces the target value wholesale.
//! Arrays are never combined, so importing a document with three bookmarks
//! leaves exactly those three.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{default_config, iso_timestamp};

/// Merge `source` into `target` in place
///
/// A non-object `source` leaves `target` unchanged.
pub fn deep_merge(target: &mut Value, source: &Value) {
    let Value::Object(source) = source else {
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(target) = target else {
        return;
    };

    for (key, value) in source {
        if value.is_object() {
            let slot = target
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            deep_merge(slot, value);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Merge `config` over a fresh default template and stamp `lastUpdated`
pub fn merge_with_defaults(config: &Value, now: DateTime<Utc>) -> Value {
    let mut merged = default_config(now);
    deep_merge(&mut merged, config);
    merged["lastUpdated"] = Value::String(iso_timestamp(now));
    merged
}
