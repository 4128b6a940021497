mod classify;
mod escape;

pub use classify::{classify, is_json, Classified};
pub use escape::escape;

use serde_json::{Map, Value};

/// Optional values merged into the payload when the caller did not set them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub channel: Option<String>,
    pub username: Option<String>,
    pub icon: Option<String>,
}

impl Overrides {
    /// Payload key and value for each non-empty override, in merge order.
    fn fields(&self) -> impl Iterator<Item = (OverrideField, &str)> {
        [
            (OverrideField::Channel, self.channel.as_deref()),
            (OverrideField::Username, self.username.as_deref()),
            (OverrideField::Icon, self.icon.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.filter(|v| !v.is_empty()).map(|v| (field, v)))
    }
}

/// An override field and the payload key it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideField {
    Channel,
    Username,
    Icon,
}

impl OverrideField {
    pub fn key(self) -> &'static str {
        match self {
            OverrideField::Channel => "channel",
            OverrideField::Username => "username",
            OverrideField::Icon => "icon_emoji",
        }
    }
}

/// An override that was not applied because the payload already had the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredOverride {
    pub field: OverrideField,
    pub value: String,
}

impl std::fmt::Display for IgnoredOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{key} already in the payload, your specified {key} {value} won't be used",
            key = self.field.key(),
            value = self.value
        )
    }
}

/// Failure while building the webhook payload.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PayloadError {
    #[error("wrapped plain-text message is not valid JSON")]
    #[diagnostic(code(slatemess::payload))]
    Envelope(#[source] serde_json::Error),
    #[error("failed to serialize payload")]
    #[diagnostic(code(slatemess::payload))]
    Serialize(#[source] serde_json::Error),
}

/// The final JSON object sent to the webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    object: Map<String, Value>,
    json: String,
    pretty: String,
    ignored: Vec<IgnoredOverride>,
}

impl Payload {
    pub fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    /// Canonical compact JSON text, keys in insertion order.
    pub fn as_json(&self) -> &str {
        &self.json
    }

    /// Indented JSON text for display.
    pub fn as_pretty_json(&self) -> &str {
        &self.pretty
    }

    /// Overrides skipped because the payload already carried the key.
    pub fn ignored_overrides(&self) -> &[IgnoredOverride] {
        &self.ignored
    }
}

/// Outcome of a set-if-absent on an object.
#[derive(Debug, PartialEq, Eq)]
pub enum Fill {
    Inserted,
    AlreadyPresent,
}

/// Insert `key` only if the object does not contain it. A key holding
/// `null` counts as present.
pub fn fill_if_absent(object: &mut Map<String, Value>, key: &str, value: &str) -> Fill {
    if object.contains_key(key) {
        return Fill::AlreadyPresent;
    }
    object.insert(key.to_string(), Value::String(value.to_string()));
    Fill::Inserted
}

/// Turn a rendered message into the payload.
///
/// A JSON object is reused as-is; anything else is escaped and wrapped as
/// `{"text": …}`. Overrides then fill only keys the object lacks.
///
/// # Examples
///
/// ```
/// use slatemess::payload::{build, Overrides};
///
/// let overrides = Overrides {
///     channel: Some("#ops".into()),
///     ..Default::default()
/// };
/// let payload = build("hello", &overrides).unwrap();
/// assert_eq!(payload.as_json(), r##"{"text":"hello","channel":"#ops"}"##);
/// ```
pub fn build(rendered: &str, overrides: &Overrides) -> Result<Payload, PayloadError> {
    let mut object = match classify(rendered) {
        Classified::Object(object) => {
            tracing::debug!("message is a JSON object, using it as the payload");
            object
        }
        Classified::Plain => {
            let envelope = format!(r#"{{"text":"{}"}}"#, escape(rendered));
            serde_json::from_str(&envelope).map_err(PayloadError::Envelope)?
        }
    };

    let mut ignored = Vec::new();
    for (field, value) in overrides.fields() {
        if fill_if_absent(&mut object, field.key(), value) == Fill::AlreadyPresent {
            ignored.push(IgnoredOverride {
                field,
                value: value.to_string(),
            });
        }
    }

    let json = serde_json::to_string(&object).map_err(PayloadError::Serialize)?;
    let pretty = serde_json::to_string_pretty(&object).map_err(PayloadError::Serialize)?;
    Ok(Payload {
        object,
        json,
        pretty,
        ignored,
    })
}
