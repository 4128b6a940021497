//! `${VAR}` substitution over the environment snapshot.
//!
//! - `${NAME}` is replaced by the variable's value, or nothing when undefined
//! - `$$` renders a literal `$`
//! - a `$` followed by anything else is kept as-is

use std::sync::LazyLock;

use regex::Regex;

use crate::environment::Environment;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$|\$\{([^{}$]*)(\})?").expect("placeholder pattern is valid"));

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("name pattern is valid"));

/// Malformed placeholder syntax in a message.
#[derive(Debug, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum TemplateError {
    #[error("unclosed placeholder at byte {offset}: expected `}}`")]
    #[diagnostic(
        code(slatemess::template),
        help("write `$${{` to send a literal `${{`")
    )]
    Unclosed { offset: usize },
    #[error("invalid variable name `{name}` at byte {offset}")]
    #[diagnostic(
        code(slatemess::template),
        help("names start with a letter or `_` and contain only letters, digits and `_`")
    )]
    InvalidName { name: String, offset: usize },
}

/// Render `raw`, substituting every `${NAME}` from `env`.
///
/// Undefined names render as the empty string. Filtered variables are
/// absent from `env`, so they behave the same way.
pub fn render(raw: &str, env: &Environment) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(raw) {
        let whole = caps.get(0).expect("group 0 always matches");
        out.push_str(&raw[last..whole.start()]);
        last = whole.end();

        if whole.as_str() == "$$" {
            out.push('$');
            continue;
        }
        if caps.get(2).is_none() {
            return Err(TemplateError::Unclosed {
                offset: whole.start(),
            });
        }
        let name = caps.get(1).map_or("", |m| m.as_str());
        if !NAME.is_match(name) {
            return Err(TemplateError::InvalidName {
                name: name.to_string(),
                offset: whole.start(),
            });
        }
        match env.get(name) {
            Some(value) => out.push_str(value),
            None => tracing::debug!(name, "template variable undefined, rendering empty"),
        }
    }
    out.push_str(&raw[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::from_pairs([
            ("HOST", "web-01"),
            ("STATUS", "ok"),
            ("_PRIVATE", "x"),
            ("JSON", "{\"a\":1}"),
        ])
    }

    #[test]
    fn substitutes_defined_variables() {
        let rendered = render("deploy on ${HOST} is ${STATUS}", &env()).unwrap();
        assert_eq!(rendered, "deploy on web-01 is ok");
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let raw = "plain text with {braces} and $5";
        assert_eq!(render(raw, &env()).unwrap(), raw);
    }

    #[test]
    fn rendering_is_idempotent_once_substituted() {
        let once = render("${HOST}/${STATUS}", &env()).unwrap();
        assert_eq!(render(&once, &env()).unwrap(), once);
    }

    #[test]
    fn undefined_variable_renders_empty() {
        assert_eq!(render("[${NOPE}]", &env()).unwrap(), "[]");
    }

    #[test]
    fn filtered_variable_renders_empty_and_never_leaks() {
        let rendered = render("value=${JSON}", &env()).unwrap();
        assert_eq!(rendered, "value=");
        assert!(!rendered.contains("\"a\""));
    }

    #[test]
    fn underscore_names_are_valid() {
        assert_eq!(render("${_PRIVATE}", &env()).unwrap(), "x");
    }

    #[test]
    fn double_dollar_is_literal() {
        assert_eq!(render("$${HOST} costs $$5", &env()).unwrap(), "${HOST} costs $5");
    }

    #[test]
    fn json_message_with_placeholder() {
        let rendered = render(r#"{"text":"${HOST} up"}"#, &env()).unwrap();
        assert_eq!(rendered, r#"{"text":"web-01 up"}"#);
    }

    #[test]
    fn unclosed_placeholder_is_an_error() {
        let err = render("hello ${HOST", &env()).unwrap_err();
        assert_eq!(err, TemplateError::Unclosed { offset: 6 });
    }

    #[test]
    fn nested_brace_is_an_error() {
        let err = render("${A{B}}", &env()).unwrap_err();
        assert!(matches!(err, TemplateError::Unclosed { offset: 0 }));
    }

    #[test]
    fn empty_name_is_an_error() {
        let err = render("x ${}", &env()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidName {
                name: String::new(),
                offset: 2
            }
        );
    }

    #[test]
    fn invalid_name_is_an_error() {
        let err = render("${1HOST}", &env()).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidName { ref name, .. } if name == "1HOST"));
    }
}
