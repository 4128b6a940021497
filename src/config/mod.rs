mod document;

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::environment::Variables;
use crate::message::Message;
use crate::payload::Overrides;
use document::{ConfigDocument, NodeValue};

/// Request timeout used when no layer sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted request timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Environment variable names read by [`Layer::from_variables`].
pub const HOOK_VAR: &str = "SLACK_HOOK";
pub const CHANNEL_VAR: &str = "SLACK_CHANNEL";
pub const USER_VAR: &str = "SLACK_USER";
pub const ICON_VAR: &str = "SLACK_ICON";

/// Validated delivery settings, built once before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub hook: Url,
    pub overrides: Overrides,
    pub dry_run: bool,
    pub timeout: Duration,
}

/// One configuration source. Unset values are `None`; empty strings count
/// as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub hook: Option<String>,
    pub channel: Option<String>,
    pub username: Option<String>,
    pub icon: Option<String>,
    pub timeout: Option<Duration>,
}

/// Errors found while assembling or validating configuration.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("missing message")]
    #[diagnostic(
        code(slatemess::config),
        help("pipe a message on stdin, or pass --message or --file")
    )]
    MissingMessage,
    #[error("missing webhook url")]
    #[diagnostic(code(slatemess::config), help("pass --hook or set SLACK_HOOK"))]
    MissingHook,
    #[error("error in url {hook}")]
    #[diagnostic(code(slatemess::config))]
    InvalidUrl {
        hook: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid hook, invalid scheme {scheme}")]
    #[diagnostic(code(slatemess::config), help("webhook urls must use https"))]
    InsecureScheme { scheme: String },
    #[error("--file and --message are mutually exclusive")]
    #[diagnostic(code(slatemess::config))]
    ConflictingInputs,
    #[error("config file not found: {}", .0.display())]
    #[diagnostic(code(slatemess::config))]
    NotFound(PathBuf),
    #[error("failed to read config")]
    #[diagnostic(code(slatemess::config))]
    ReadError(#[from] std::io::Error),
    #[error("invalid KDL syntax: {0}")]
    #[diagnostic(code(slatemess::config))]
    ParseError(String),
    #[error("invalid config: {0}")]
    #[diagnostic(code(slatemess::config))]
    ValidationError(String),
}

impl Layer {
    /// Read the `SLACK_*` variables.
    pub fn from_variables(vars: &Variables) -> Self {
        let get = |name: &str| non_empty(vars.get(name));
        Layer {
            hook: get(HOOK_VAR),
            channel: get(CHANNEL_VAR),
            username: get(USER_VAR),
            icon: get(ICON_VAR),
            timeout: None,
        }
    }

    /// Load a KDL config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_document(&ConfigDocument::load(path)?)
    }

    /// Parse KDL config text.
    ///
    /// ```
    /// use slatemess::config::Layer;
    ///
    /// let layer = Layer::parse(r##"channel "#ops""##).unwrap();
    /// assert_eq!(layer.channel.as_deref(), Some("#ops"));
    /// ```
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_document(&ConfigDocument::parse(content)?)
    }

    fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        let mut layer = Layer::default();
        let mut seen: Vec<&str> = Vec::new();
        for node in doc.nodes() {
            let name = node.name();
            let line = node.line();
            let value = node.single_value()?;
            let slot = match name {
                "hook" => &mut layer.hook,
                "channel" => &mut layer.channel,
                "username" => &mut layer.username,
                "icon" => &mut layer.icon,
                "timeout" => {
                    if seen.contains(&name) {
                        return Err(duplicate(name, line));
                    }
                    seen.push(name);
                    layer.timeout = Some(timeout_value(value, line)?);
                    continue;
                }
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "line {line}: unknown setting '{other}'"
                    )))
                }
            };
            // An empty value leaves the slot unset but still counts as set.
            if seen.contains(&name) {
                return Err(duplicate(name, line));
            }
            seen.push(name);
            match value {
                NodeValue::String(s) => *slot = non_empty(Some(s)),
                _ => {
                    return Err(ConfigError::ValidationError(format!(
                        "line {line}: {name} must be a string"
                    )))
                }
            }
        }
        Ok(layer)
    }

    /// Write the set values back as `SLACK_*` variables so templates see
    /// the effective settings.
    pub fn export(&self, vars: &mut Variables) {
        let pairs = [
            (HOOK_VAR, &self.hook),
            (CHANNEL_VAR, &self.channel),
            (USER_VAR, &self.username),
            (ICON_VAR, &self.icon),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                vars.set(name, value.as_str());
            }
        }
    }

    /// Combine with a higher-precedence layer; its set values win.
    pub fn merge(self, higher: Layer) -> Layer {
        Layer {
            hook: higher.hook.or(self.hook),
            channel: higher.channel.or(self.channel),
            username: higher.username.or(self.username),
            icon: higher.icon.or(self.icon),
            timeout: higher.timeout.or(self.timeout),
        }
    }
}

impl DeliveryConfig {
    /// Merge `layers` from lowest to highest precedence and validate the result.
    pub fn from_layers(layers: &[Layer], dry_run: bool) -> Result<Self, ConfigError> {
        let merged = layers
            .iter()
            .cloned()
            .fold(Layer::default(), Layer::merge);
        let hook = merged.hook.ok_or(ConfigError::MissingHook)?;
        let timeout = merged.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() || timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
            return Err(ConfigError::ValidationError(format!(
                "timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"
            )));
        }
        Ok(DeliveryConfig {
            hook: parse_hook(&hook)?,
            overrides: Overrides {
                channel: merged.channel,
                username: merged.username,
                icon: merged.icon,
            },
            dry_run,
            timeout,
        })
    }
}

/// Check everything that must hold before any rendering or network activity.
pub fn verify(message: &Message, layers: &[Layer], dry_run: bool) -> Result<DeliveryConfig, ConfigError> {
    if message.is_empty() {
        return Err(ConfigError::MissingMessage);
    }
    DeliveryConfig::from_layers(layers, dry_run)
}

/// Parse the webhook URL and require a secure scheme.
pub fn parse_hook(hook: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(hook).map_err(|source| ConfigError::InvalidUrl {
        hook: hook.to_string(),
        source,
    })?;
    if url.scheme() != "https" {
        return Err(ConfigError::InsecureScheme {
            scheme: url.scheme().to_string(),
        });
    }
    Ok(url)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(String::from)
}

fn duplicate(name: &str, line: usize) -> ConfigError {
    ConfigError::ValidationError(format!("line {line}: {name} is set more than once"))
}

fn timeout_value(value: NodeValue<'_>, line: usize) -> Result<Duration, ConfigError> {
    match value {
        NodeValue::Integer(secs) if secs > i128::from(MAX_TIMEOUT_SECS) => Err(ConfigError::ValidationError(
            format!("line {line}: timeout must be at most {MAX_TIMEOUT_SECS} seconds"),
        )),
        NodeValue::Integer(secs) if secs > 0 => Ok(Duration::from_secs(secs as u64)),
        _ => Err(ConfigError::ValidationError(format!(
            "line {line}: timeout must be a positive number of seconds"
        ))),
    }
}
