use orka_core::{Tree, MANAGED_FIELDS, METADATA};
use serde_json::Map;

/// Deep copy of `obj`, minus `metadata.managedFields` when `hide_managed` is set.
///
/// Shapes without a `metadata` mapping pass through unchanged.
pub fn redact(obj: &Tree, hide_managed: bool) -> Tree {
    let mut out = obj.clone();
    if hide_managed {
        strip_managed_fields(&mut out);
    }
    out
}

fn strip_managed_fields(v: &mut Tree) {
    let Some(meta) = v.get_mut(METADATA).and_then(|m| m.as_object_mut()) else {
        return;
    };
    if !meta.contains_key(MANAGED_FIELDS) {
        return;
    }
    // Rebuild instead of `remove` so the remaining keys keep their order
    let kept: Map<String, Tree> = std::mem::take(meta)
        .into_iter()
        .filter(|(k, _)| k != MANAGED_FIELDS)
        .collect();
    *meta = kept;
}
