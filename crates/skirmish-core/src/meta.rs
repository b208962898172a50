//! Unit metadata dictionaries and their merge rules.
//!
//! Metadata patches are JSON objects. A key mapped to `null` is a delete
//! marker: applying the patch removes the key. Both the command queue
//! (when coalescing `meta` commands) and the transform (when applying
//! them) go through this module so the two can never disagree.

use serde_json::{Map, Value};

/// Free-form per-unit metadata.
pub type Meta = Map<String, Value>;

/// Apply `patch` to `target` key by key.
///
/// Defined keys overwrite; `null` removes the key.
pub fn merge_meta(target: &mut Meta, patch: &Meta) {
    for (key, value) in patch {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Fold a later patch into an earlier one.
///
/// Unlike [`merge_meta`], delete markers are kept so that applying the
/// folded patch has the same effect as applying both in order.
pub fn merge_patch(earlier: &mut Meta, later: &Meta) {
    for (key, value) in later {
        earlier.insert(key.clone(), value.clone());
    }
}
