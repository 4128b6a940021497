use serde_json::{Map, Value};

/// Outcome of inspecting a rendered message.
#[derive(Debug, PartialEq)]
pub enum Classified {
    /// The message is a JSON object and is used as the payload itself.
    Object(Map<String, Value>),
    /// Anything else, including JSON arrays and scalars.
    Plain,
}

/// Decide whether `text` is already a JSON object payload.
///
/// The parsed object is returned so the builder never parses twice.
pub fn classify(text: &str) -> Classified {
    match serde_json::from_str::<Map<String, Value>>(text) {
        Ok(object) => Classified::Object(object),
        Err(e) => {
            tracing::debug!(error = %e, "message is not a JSON object");
            Classified::Plain
        }
    }
}

/// Whether `text` parses as a JSON object.
pub fn is_json(text: &str) -> bool {
    matches!(classify(text), Classified::Object(_))
}
