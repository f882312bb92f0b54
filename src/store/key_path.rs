//! Dot-separated key paths inside a document

use serde_json::{Map, Value};

use super::error::{StoreError, StoreResult};

/// Remove the property addressed by `key_path` (e.g. `"a.b.c"`).
///
/// Every segment but the last must name an existing object; the last must
/// be a property of that object. Nothing is created along the way, and the
/// document is left untouched on failure. Arrays are not indexed: a path
/// through an array (e.g. `"list.0"`) is reported as not found.
///
/// The remaining keys keep their order.
pub fn remove_key(doc: &mut Map<String, Value>, key_path: &str) -> StoreResult<Value> {
    let not_found = || StoreError::KeyNotFound(key_path.to_string());

    let mut segments: Vec<&str> = key_path.split('.').collect();
    let last = segments.pop().ok_or_else(not_found)?;

    let mut current = doc;
    for segment in segments {
        current = current
            .get_mut(segment)
            .and_then(Value::as_object_mut)
            .ok_or_else(not_found)?;
    }

    current.shift_remove(last).ok_or_else(not_found)
}
