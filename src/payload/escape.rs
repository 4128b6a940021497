use serde_json::Value;

/// Trim `text` and encode it as the contents of a JSON string literal.
///
/// The result has no surrounding quotes. Escaping is not idempotent: call it
/// once, and only on plain text about to be embedded in a JSON string.
pub fn escape(text: &str) -> String {
    let encoded = Value::from(text.trim()).to_string();
    encoded[1..encoded.len() - 1].to_string()
}
