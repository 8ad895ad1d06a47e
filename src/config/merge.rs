use serde_yaml::Value;

/// Merge `overlay` into `base`, the overlay winning on conflicts.
///
/// Two mappings merge key by key, recursively. Anything else (sequences,
/// tagged values, scalars, null) replaces the base value outright; sequences
/// are never concatenated or merged element-wise.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Merge layers in ascending precedence.
///
/// A `Null` layer stands for an absent source and contributes nothing.
pub fn merge_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut merged = Value::Mapping(Default::default());
    for layer in layers {
        if layer.is_null() {
            continue;
        }
        deep_merge(&mut merged, layer);
    }
    merged
}
