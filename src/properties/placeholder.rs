//! Property placeholders: `{{name}}`, `{{name:default}}`, `{{?name}}`,
//! `{{env:NAME}}` and `{{secret:name/key}}`.
use crate::error::PlaceholderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// A property from the runtime configuration, optionally with a default.
    Property {
        name: String,
        default: Option<String>,
        optional: bool,
    },
    /// An environment variable.
    Env(String),
    /// A key of a mounted secret.
    Secret { name: String, key: String },
}

/// Extracts every placeholder from `text`. Text without `{{` yields an empty list.
pub fn parse_placeholders(text: &str) -> Result<Vec<Placeholder>, PlaceholderError> {
    let mut found = Vec::new();
    let mut offset = 0;
    while let Some(start) = text[offset..].find("{{") {
        let at = offset + start;
        let body_start = at + 2;
        let end = text[body_start..]
            .find("}}")
            .ok_or(PlaceholderError::Unterminated { at })?;
        let body = text[body_start..body_start + end].trim();
        if body.is_empty() {
            return Err(PlaceholderError::Empty { at });
        }
        found.push(parse_one(body)?);
        offset = body_start + end + 2;
    }
    Ok(found)
}

/// True if the whole of `text` is one well-formed placeholder.
///
/// Typed fields (numbers, booleans, enums) accept such a value in place of a
/// literal; text around the placeholder is not allowed.
pub fn is_placeholder(text: &str) -> bool {
    let text = text.trim();
    text.starts_with("{{")
        && text.ends_with("}}")
        && matches!(parse_placeholders(text).as_deref(), Ok([_]))
}

fn parse_one(body: &str) -> Result<Placeholder, PlaceholderError> {
    let malformed = |reason: &str| PlaceholderError::Malformed {
        placeholder: format!("{{{{{}}}}}", body),
        reason: reason.to_string(),
    };

    if let Some(var) = body.strip_prefix("env:") {
        if var.is_empty() || !var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(malformed("environment variable names use letters, digits and '_'"));
        }
        return Ok(Placeholder::Env(var.to_string()));
    }

    if let Some(reference) = body.strip_prefix("secret:") {
        return match reference.split_once('/') {
            Some((name, key)) if is_name(name) && is_name(key) => Ok(Placeholder::Secret {
                name: name.to_string(),
                key: key.to_string(),
            }),
            _ => Err(malformed("secrets are referenced as 'secret:name/key'")),
        };
    }

    let (optional, rest) = match body.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let (name, default) = match rest.split_once(':') {
        Some((name, default)) => (name, Some(default.to_string())),
        None => (rest, None),
    };
    if !is_name(name) {
        return Err(malformed("property names use letters, digits, '.', '-' and '_'"));
    }
    Ok(Placeholder::Property {
        name: name.to_string(),
        default,
        optional,
    })
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

