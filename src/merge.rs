use tracing::warn;

use crate::value::{ConfigTree, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a mapping for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(mut base: ConfigTree, overlay: ConfigTree) -> ConfigTree {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Map(base_map)), Value::Map(overlay_map)) => {
                base.insert(key, Value::Map(deep_merge(base_map, overlay_map)));
            }
            (Some(replaced), overlay_val) => {
                if matches!(replaced, Value::Map(_)) != matches!(overlay_val, Value::Map(_)) {
                    warn!(
                        key = %key,
                        replaced = replaced.type_name(),
                        with = overlay_val.type_name(),
                        "merge collision between mapping and leaf"
                    );
                }
                base.insert(key, overlay_val);
            }
            (None, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}
