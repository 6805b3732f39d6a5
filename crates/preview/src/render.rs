use orka_core::{PreviewLimits, SerializationError, Tree};
use serde::Serialize;

/// Encode any serializable value as block-style YAML.
///
/// The value is first lowered to a [`Tree`]; a `Serialize` impl that refuses to
/// encode surfaces as [`SerializationError::Unsupported`]. The dialog and the
/// CLI already hold a tree and go through [`serialize_tree`] only.
pub fn serialize<T: Serialize + ?Sized>(
    obj: &T,
    limits: &PreviewLimits,
) -> Result<String, SerializationError> {
    let tree = serde_json::to_value(obj).map_err(|e| SerializationError::Unsupported(e.to_string()))?;
    serialize_tree(&tree, limits)
}

/// Encode a tree as block-style YAML, keys in insertion order.
pub fn serialize_tree(obj: &Tree, limits: &PreviewLimits) -> Result<String, SerializationError> {
    check_shape(obj, limits)?;
    serde_yaml::to_string(obj).map_err(|e| SerializationError::Encode(e.to_string()))
}

fn check_shape(v: &Tree, limits: &PreviewLimits) -> Result<(), SerializationError> {
    fn walk(v: &Tree, depth: usize, seen: &mut usize, limits: &PreviewLimits) -> Result<(), SerializationError> {
        if depth > limits.max_depth {
            return Err(SerializationError::TooDeep { max: limits.max_depth });
        }
        *seen += 1;
        if *seen > limits.max_nodes {
            return Err(SerializationError::TooManyNodes { max: limits.max_nodes });
        }
        match v {
            Tree::Object(map) => {
                for vv in map.values() {
                    walk(vv, depth + 1, seen, limits)?;
                }
            }
            Tree::Array(arr) => {
                for vv in arr.iter() {
                    walk(vv, depth + 1, seen, limits)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
    let mut seen = 0usize;
    walk(v, 0, &mut seen, limits)
}
