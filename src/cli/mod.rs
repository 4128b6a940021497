pub mod send;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Layer;

/// Parsed command-line values, independent of the argument parser.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub hook: Option<String>,
    pub channel: Option<String>,
    pub user: Option<String>,
    pub icon: Option<String>,
    pub message: Option<String>,
    pub file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub fence: bool,
    pub dry_run: bool,
    pub debug: bool,
}

impl Options {
    /// The highest-precedence configuration layer.
    pub(crate) fn flag_layer(&self) -> Layer {
        let set = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        Layer {
            hook: set(&self.hook),
            channel: set(&self.channel),
            username: set(&self.user),
            icon: set(&self.icon),
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_layer_skips_empty_values() {
        let options = Options {
            hook: Some("https://hooks.example.com/x".into()),
            channel: Some(String::new()),
            user: Some("bot".into()),
            timeout: Some(3),
            ..Default::default()
        };
        let layer = options.flag_layer();
        assert_eq!(layer.hook.as_deref(), Some("https://hooks.example.com/x"));
        assert_eq!(layer.channel, None);
        assert_eq!(layer.username.as_deref(), Some("bot"));
        assert_eq!(layer.icon, None);
        assert_eq!(layer.timeout, Some(Duration::from_secs(3)));
    }
}
