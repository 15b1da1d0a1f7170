//! Recursive JSON merges used when layering caller parameters onto payloads.
//!
//! Precedence for [`merge_recursive`]:
//! - object + object: merged key by key, recursively
//! - array + array: overlay elements appended after base elements
//! - anything else: overlay value replaces base value
//!
//! [`replace_recursive`] differs only for arrays: the overlay array replaces the base.

use serde_json::{Map, Value};

/// Layer `overlay` onto `base`; arrays concatenate.
pub fn merge_recursive(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => merge_object(base, overlay),
        (Value::Array(base), Value::Array(overlay)) => base.extend(overlay),
        (base, overlay) => *base = overlay,
    }
}

/// [`merge_recursive`] for two objects.
pub fn merge_object(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_recursive(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Layer `overlay` onto `base`; only objects are merged, everything else is replaced.
pub fn replace_recursive(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => replace_recursive(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge() {
        let mut base = json!({"recipient": {"id": "1"}, "message": {"text": "hi"}});
        merge_recursive(&mut base, json!({"message": {"metadata": "m"}, "tag": "UPDATE"}));
        assert_eq!(
            base,
            json!({"recipient": {"id": "1"}, "message": {"text": "hi", "metadata": "m"}, "tag": "UPDATE"})
        );
    }

    #[test]
    fn arrays_concatenate() {
        let mut base = json!({"list": [1, 2]});
        merge_recursive(&mut base, json!({"list": [3]}));
        assert_eq!(base, json!({"list": [1, 2, 3]}));
    }

    #[test]
    fn scalars_from_overlay_win() {
        let mut base = json!({"recipient": {"id": "1"}, "notification_type": "REGULAR"});
        merge_recursive(
            &mut base,
            json!({"recipient": {"id": "2"}, "notification_type": "SILENT_PUSH"}),
        );
        assert_eq!(base, json!({"recipient": {"id": "2"}, "notification_type": "SILENT_PUSH"}));
    }

    #[test]
    fn type_mismatch_replaces() {
        let mut base = json!({"a": {"b": 1}});
        merge_recursive(&mut base, json!({"a": [1]}));
        assert_eq!(base, json!({"a": [1]}));
    }

    #[test]
    fn replace_recursive_replaces_arrays() {
        let mut base = json!({"access_token": "T", "setting": {"list": [1, 2], "keep": true}});
        replace_recursive(&mut base, json!({"access_token": "OTHER", "setting": {"list": [3]}}));
        assert_eq!(
            base,
            json!({"access_token": "OTHER", "setting": {"list": [3], "keep": true}})
        );
    }
}
