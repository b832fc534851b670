//! Expression languages and what happens to the text when the language changes.
use crate::error::DesignerError;
use crate::model::ExpressionValue;

pub const DEFAULT_LANGUAGE: &str = "simple";

/// Languages whose expressions read alike. Text written for one language of a
/// family stays meaningful in another; across families it does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// `${...}` style templates.
    Template,
    /// General purpose scripting languages.
    Script,
    /// Document path queries.
    Path,
    /// A bare name looked up at runtime (a header, a bean...).
    Reference,
}

const LANGUAGES: &[(&str, LanguageFamily)] = &[
    ("simple", LanguageFamily::Template),
    ("constant", LanguageFamily::Template),
    ("tokenize", LanguageFamily::Template),
    ("csimple", LanguageFamily::Template),
    ("datasonnet", LanguageFamily::Script),
    ("groovy", LanguageFamily::Script),
    ("joor", LanguageFamily::Script),
    ("js", LanguageFamily::Script),
    ("mvel", LanguageFamily::Script),
    ("ognl", LanguageFamily::Script),
    ("python", LanguageFamily::Script),
    ("spel", LanguageFamily::Script),
    ("jq", LanguageFamily::Path),
    ("jsonpath", LanguageFamily::Path),
    ("xpath", LanguageFamily::Path),
    ("xquery", LanguageFamily::Path),
    ("header", LanguageFamily::Reference),
    ("exchangeProperty", LanguageFamily::Reference),
    ("variable", LanguageFamily::Reference),
    ("method", LanguageFamily::Reference),
    ("ref", LanguageFamily::Reference),
];

/// Every known language, in menu order.
pub fn languages() -> impl Iterator<Item = &'static str> {
    LANGUAGES.iter().map(|(name, _)| *name)
}

pub fn language_family(language: &str) -> Option<LanguageFamily> {
    LANGUAGES
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, family)| *family)
}

/// Moves an expression to another language. The text survives when both
/// languages belong to the same family and is cleared otherwise.
pub fn switch_language(
    current: &ExpressionValue,
    language: &str,
) -> Result<ExpressionValue, DesignerError> {
    let target = language_family(language).ok_or_else(|| DesignerError::InvalidValue {
        type_tag: "Expression".to_string(),
        property: "language".to_string(),
        value: language.to_string(),
        reason: "unknown expression language".to_string(),
    })?;
    let keep = language_family(&current.language) == Some(target);
    Ok(ExpressionValue::new(
        language,
        if keep { current.value.as_str() } else { "" },
    ))
}
