//! The raw message and where it came from.

use std::io::Read;
use std::path::{Path, PathBuf};

/// Origin of the raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Stdin,
    Literal,
    File(PathBuf),
}

/// Raw message text, created once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    source: MessageSource,
}

/// Failure reading the message from its source.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum InputError {
    #[error("failed to read message from stdin")]
    #[diagnostic(code(slatemess::input))]
    Stdin(#[source] std::io::Error),
    #[error("failed to read message file {}", .path.display())]
    #[diagnostic(code(slatemess::input))]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Message {
    pub fn literal(text: impl Into<String>) -> Self {
        Message {
            text: text.into(),
            source: MessageSource::Literal,
        }
    }

    /// Read the whole file as UTF-8 text.
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::File {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Message {
            text,
            source: MessageSource::File(path.to_path_buf()),
        })
    }

    /// Read everything from `reader` as UTF-8 text.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, InputError> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(InputError::Stdin)?;
        Ok(Message {
            text,
            source: MessageSource::Stdin,
        })
    }

    /// Wrap the text in a code fence so it displays as a code block.
    pub fn fenced(self) -> Self {
        Message {
            text: format!("```{}```", self.text),
            source: self.source,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &MessageSource {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn literal_keeps_text_verbatim() {
        let message = Message::literal("  hi\n");
        assert_eq!(message.text(), "  hi\n");
        assert_eq!(message.source(), &MessageSource::Literal);
    }

    #[test]
    fn reads_whole_file() {
        let mut tmpfile = NamedTempFile::new().unwrap();
        write!(tmpfile, "line one\nline two\n").unwrap();

        let message = Message::from_file(tmpfile.path()).unwrap();
        assert_eq!(message.text(), "line one\nline two\n");
        assert_eq!(
            message.source(),
            &MessageSource::File(tmpfile.path().to_path_buf())
        );
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Message::from_file(Path::new("/tmp/does-not-exist-slatemess.txt")).unwrap_err();
        assert!(matches!(err, InputError::File { .. }));
        assert!(err.to_string().contains("/tmp/does-not-exist-slatemess.txt"));
    }

    #[test]
    fn io_cause_is_chained_not_repeated() {
        let err = Message::from_file(Path::new("/tmp/does-not-exist-slatemess.txt")).unwrap_err();
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert!(!err.to_string().contains(&cause), "got: {err}");
    }

    #[test]
    fn non_utf8_file_is_an_error() {
        let mut tmpfile = NamedTempFile::new().unwrap();
        tmpfile.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        assert!(Message::from_file(tmpfile.path()).is_err());
    }

    #[test]
    fn reads_from_reader() {
        let message = Message::from_reader("piped\n".as_bytes()).unwrap();
        assert_eq!(message.text(), "piped\n");
        assert_eq!(message.source(), &MessageSource::Stdin);
    }

    #[test]
    fn fence_wraps_text() {
        let message = Message::literal("ls -la").fenced();
        assert_eq!(message.text(), "```ls -la```");
    }

    #[test]
    fn empty_message_is_empty() {
        assert!(Message::literal("").is_empty());
        assert!(!Message::literal(" ").is_empty());
    }
}
