//! Shape verification for chained hook results.

use serde_json::Value;

/// Check whether a callback's output is shape-compatible with the payload the
/// chain started from.
///
/// The output is compatible when it is an object whose top-level key set is a
/// subset of the input's top-level key set: no new keys introduced, missing
/// keys permitted. Values are never compared. A null (or any non-object)
/// output is never compatible.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sluice_hooks::shape_compatible;
///
/// let input = json!({"client": "10.0.0.1", "port": 5432});
///
/// assert!(shape_compatible(&input, &input));
/// assert!(shape_compatible(&input, &json!({"port": 6432})));
/// assert!(!shape_compatible(&input, &json!({"port": 6432, "spoofed": true})));
/// assert!(!shape_compatible(&input, &serde_json::Value::Null));
/// ```
pub fn shape_compatible(input: &Value, output: &Value) -> bool {
    let (Some(input), Some(output)) = (input.as_object(), output.as_object()) else {
        return false;
    };
    output.keys().all(|key| input.contains_key(key))
}
