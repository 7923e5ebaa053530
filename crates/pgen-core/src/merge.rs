//! Structural merges over YAML trees
//!
//! All functions are pure: inputs are borrowed and a new tree is returned.

use serde_yaml::{Mapping, Value};

/// Merge `new` onto `old`.
///
/// Mappings union their keys and merge overlapping values recursively.
/// Sequences concatenate, `old` first. Any other `new` value replaces
/// `old`, except null, which leaves `old` in place.
pub fn deep_merge(old: &Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Mapping(old_map), Value::Mapping(new_map)) => {
            Value::Mapping(deep_merge_mappings(old_map, new_map))
        }
        (Value::Sequence(old_items), Value::Sequence(new_items)) => {
            Value::Sequence(old_items.iter().chain(new_items).cloned().collect())
        }
        (old, Value::Null) => old.clone(),
        (_, new) => new.clone(),
    }
}

pub fn deep_merge_mappings(old: &Mapping, new: &Mapping) -> Mapping {
    let mut merged = old.clone();
    for (key, new_value) in new {
        let value = match old.get(key) {
            Some(old_value) => deep_merge(old_value, new_value),
            None => new_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Copy into `dest` every key of `src` that `dest` lacks, recursing where
/// both sides hold a mapping. Values already in `dest` are never changed.
pub fn merge_without_override(dest: &Value, src: &Value) -> Value {
    match (dest, src) {
        (Value::Mapping(dest_map), Value::Mapping(src_map)) => {
            Value::Mapping(merge_mappings_without_override(dest_map, src_map))
        }
        (dest, _) => dest.clone(),
    }
}

pub fn merge_mappings_without_override(dest: &Mapping, src: &Mapping) -> Mapping {
    let mut merged = dest.clone();
    for (key, src_value) in src {
        match dest.get(key) {
            Some(dest_value) => {
                merged.insert(key.clone(), merge_without_override(dest_value, src_value));
            }
            None => {
                merged.insert(key.clone(), src_value.clone());
            }
        }
    }
    merged
}

/// Drop null and empty-string items from every sequence in the tree.
///
/// Mapping values that are null stay: `c:` with nothing under it still
/// declares the key.
pub fn eliminate_none(value: &Value) -> Value {
    match value {
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .filter(|item| !is_placeholder(item))
                .map(eliminate_none)
                .collect(),
        ),
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(key, item)| (key.clone(), eliminate_none(item)))
                .collect(),
        ),
        Value::Tagged(tagged) => {
            let mut tagged = (**tagged).clone();
            tagged.value = eliminate_none(&tagged.value);
            Value::Tagged(Box::new(tagged))
        }
        other => other.clone(),
    }
}

fn is_placeholder(item: &Value) -> bool {
    match item {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Append the items `dest` does not hold yet, keeping first occurrences.
pub fn extend_unique<'a>(dest: &mut Vec<String>, items: impl IntoIterator<Item = &'a String>) {
    for item in items {
        if !dest.contains(item) {
            dest.push(item.clone());
        }
    }
}
