//! Process variables and the filtered snapshot templates render against.
//!
//! [`Variables`] is the raw merged view (env files, process environment,
//! exported flags) that configuration is read from. [`Environment`] is the
//! filtered snapshot handed to the template renderer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Characters that would corrupt a naively embedded JSON payload.
const FORBIDDEN_CHARS: [char; 4] = ['{', '}', '"', '\\'];

/// Raw variable set, merged from every source before filtering.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    vars: BTreeMap<String, String>,
}

impl Variables {
    /// Capture the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        Self::from_pairs(
            std::env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Variables {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Set a variable, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Set a variable only if it is not already defined.
    ///
    /// Returns `true` when the value was inserted.
    pub fn set_default(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.vars.contains_key(&name) {
            return false;
        }
        self.vars.insert(name, value.into());
        true
    }

    /// Fill gaps from each env file in order. Earlier files win over later
    /// ones and every file loses to variables already present.
    pub fn load_env_files<P: AsRef<Path>>(&mut self, paths: &[P]) {
        for path in paths {
            let path = path.as_ref();
            let iter = match dotenvy::from_path_iter(path) {
                Ok(iter) => iter,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "env file not loaded");
                    continue;
                }
            };
            let mut added = 0usize;
            for item in iter {
                match item {
                    Ok((key, value)) => {
                        if self.set_default(key, value) {
                            added += 1;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "skipping malformed env file entry");
                    }
                }
            }
            tracing::debug!(path = %path.display(), added, "loaded env file");
        }
    }

    /// Build the filtered snapshot used for template rendering.
    pub fn snapshot(&self) -> Environment {
        Environment::from_pairs(self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// The env files consulted by default, in precedence order.
///
/// `home` is the user's home directory, when known.
pub fn default_env_files(home: Option<&Path>) -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(".env")];
    if let Some(home) = home {
        files.push(home.join(".slatemess"));
    }
    files.push(PathBuf::from("/etc/slatemess.cfg"));
    files.push(PathBuf::from("/etc/slack.cfg"));
    files
}

/// Template context: variable name to value, without unsafe values.
///
/// Any value containing `{`, `}`, `"` or `\` is excluded entirely, so a
/// reference to it renders as if the variable were undefined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !is_forbidden(v))
            .collect();
        Environment { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Whether a value contains characters that are unsafe to substitute.
pub fn is_forbidden(value: &str) -> bool {
    value.contains(FORBIDDEN_CHARS.as_slice())
}
