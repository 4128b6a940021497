//! Config document abstraction layer.
//!
//! `ConfigDocument` and `ParseNode` wrap the `kdl` crate types so the rest
//! of the config module never touches KDL directly.

use super::ConfigError;

/// Parsed KDL document paired with its source text.
pub(super) struct ConfigDocument {
    doc: kdl::KdlDocument,
    source: String,
}

/// Single KDL node with source context for line-number reporting.
pub(super) struct ParseNode<'a> {
    node: &'a kdl::KdlNode,
    source: &'a str,
}

/// The one value a setting node carries.
pub(super) enum NodeValue<'a> {
    String(&'a str),
    Integer(i128),
    Other,
}

impl ConfigDocument {
    /// Parse a KDL source string into a document.
    pub(super) fn parse(source: &str) -> Result<Self, ConfigError> {
        let doc: kdl::KdlDocument = source
            .parse()
            .map_err(|e: kdl::KdlError| ConfigError::ParseError(e.to_string()))?;
        Ok(Self {
            doc,
            source: source.to_string(),
        })
    }

    /// Load and parse a KDL config file.
    pub(super) fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::ReadError(e)
            }
        })?;
        Self::parse(&content)
    }

    /// Iterate over all top-level nodes.
    pub(super) fn nodes(&self) -> Vec<ParseNode<'_>> {
        self.doc
            .nodes()
            .iter()
            .map(|node| ParseNode {
                node,
                source: &self.source,
            })
            .collect()
    }
}

impl<'a> ParseNode<'a> {
    /// The node's identifier (e.g. `"hook"`, `"timeout"`).
    pub(super) fn name(&self) -> &'a str {
        self.node.name().value()
    }

    /// The single positional value of a setting node.
    ///
    /// Rejects nodes with zero or several entries, named properties, or a
    /// children block.
    pub(super) fn single_value(&self) -> Result<NodeValue<'a>, ConfigError> {
        let name = self.name();
        let line = self.line();
        if self.node.children().is_some() {
            return Err(ConfigError::ValidationError(format!(
                "line {line}: {name} does not take a children block"
            )));
        }
        let entries = self.node.entries();
        if entries.len() != 1 || entries[0].name().is_some() {
            return Err(ConfigError::ValidationError(format!(
                "line {line}: {name} takes exactly one value"
            )));
        }
        let value = entries[0].value();
        Ok(if let Some(s) = value.as_string() {
            NodeValue::String(s)
        } else if let Some(i) = value.as_integer() {
            NodeValue::Integer(i)
        } else {
            NodeValue::Other
        })
    }

    /// 1-based line number of this node in the config source.
    pub(super) fn line(&self) -> usize {
        let offset = self.node.span().offset();
        self.source[..offset.min(self.source.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
            + 1
    }
}
