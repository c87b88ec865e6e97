use serde_json::Value;

/// Plain key/value record predicate.
///
/// Arrays, strings, numbers, booleans and `null` are not records.
pub fn is_plain_record(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}
