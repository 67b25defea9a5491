use std::fmt;

use crate::position::TextPosition;

/// The single error type shared by every phase of the ADQL toolchain
/// (identifier normalization, metadata construction, lexing, parsing,
/// checking, translation).
///
/// Translator failures are constructed without a position (the AST has
/// already been checked, so the original source span is no longer tracked
/// through translation) while every other kind normally carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdqlError {
    MissingName(Option<TextPosition>),
    Syntax {
        message: String,
        position: Option<TextPosition>,
        expected: Vec<String>,
    },
    UnresolvedIdentifier {
        message: String,
        position: TextPosition,
        candidates: Vec<String>,
    },
    TypeMismatch {
        message: String,
        position: TextPosition,
    },
    DisallowedFeature {
        message: String,
        position: TextPosition,
    },
    InvalidMetadata {
        message: String,
    },
    Translation {
        message: String,
    },
}

impl AdqlError {
    pub fn missing_name() -> Self {
        AdqlError::MissingName(None)
    }

    pub fn missing_name_at(position: TextPosition) -> Self {
        AdqlError::MissingName(Some(position))
    }

    pub fn syntax(message: impl Into<String>, position: TextPosition, expected: Vec<String>) -> Self {
        AdqlError::Syntax {
            message: message.into(),
            position: Some(position),
            expected,
        }
    }

    pub fn unresolved_identifier(
        message: impl Into<String>,
        position: TextPosition,
        candidates: Vec<String>,
    ) -> Self {
        AdqlError::UnresolvedIdentifier {
            message: message.into(),
            position,
            candidates,
        }
    }

    pub fn type_mismatch(message: impl Into<String>, position: TextPosition) -> Self {
        AdqlError::TypeMismatch {
            message: message.into(),
            position,
        }
    }

    pub fn disallowed_feature(message: impl Into<String>, position: TextPosition) -> Self {
        AdqlError::DisallowedFeature {
            message: message.into(),
            position,
        }
    }

    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        AdqlError::InvalidMetadata { message: message.into() }
    }

    pub fn translation(message: impl Into<String>) -> Self {
        AdqlError::Translation { message: message.into() }
    }

    /// Position used to order accumulated checker diagnostics; errors with
    /// no position (metadata/translation) sort first.
    pub fn position(&self) -> Option<TextPosition> {
        match self {
            AdqlError::MissingName(p) => *p,
            AdqlError::Syntax { position, .. } => *position,
            AdqlError::UnresolvedIdentifier { position, .. } => Some(*position),
            AdqlError::TypeMismatch { position, .. } => Some(*position),
            AdqlError::DisallowedFeature { position, .. } => Some(*position),
            AdqlError::InvalidMetadata { .. } => None,
            AdqlError::Translation { .. } => None,
        }
    }
}

fn write_prefixed(f: &mut fmt::Formatter<'_>, position: Option<TextPosition>, message: &str) -> fmt::Result {
    match position {
        Some(pos) => write!(f, "{pos} {message}"),
        None => write!(f, "{message}"),
    }
}

impl fmt::Display for AdqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdqlError::MissingName(position) => write_prefixed(f, *position, "Missing ADQL name!"),
            AdqlError::Syntax { message, position, .. } => write_prefixed(f, *position, message),
            AdqlError::UnresolvedIdentifier { message, position, candidates } => {
                write_prefixed(f, Some(*position), message)?;
                if !candidates.is_empty() {
                    write!(f, " (candidates: {})", candidates.join(", "))?;
                }
                Ok(())
            }
            AdqlError::TypeMismatch { message, position } => write_prefixed(f, Some(*position), message),
            AdqlError::DisallowedFeature { message, position } => write_prefixed(f, Some(*position), message),
            AdqlError::InvalidMetadata { message } => write!(f, "{message}"),
            AdqlError::Translation { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for AdqlError {}

pub type AdqlResult<T> = Result<T, AdqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_message() {
        let err = AdqlError::missing_name();
        assert_eq!(err.to_string(), "Missing ADQL name!");
    }

    #[test]
    fn syntax_error_prefixes_position() {
        let err = AdqlError::syntax("unexpected token", TextPosition::at(1, 5), vec!["SELECT".into()]);
        assert_eq!(err.to_string(), "[l.1 c.5] unexpected token");
    }

    #[test]
    fn unresolved_identifier_lists_candidates() {
        let err = AdqlError::unresolved_identifier(
            "Unresolved table: \"foo\"",
            TextPosition::at(2, 1),
            vec!["public.foo".into(), "other.foo".into()],
        );
        assert_eq!(
            err.to_string(),
            "[l.2 c.1] Unresolved table: \"foo\" (candidates: public.foo, other.foo)"
        );
    }

    #[test]
    fn translation_error_has_no_position() {
        let err = AdqlError::translation("dialect cannot express OFFSET without FETCH");
        assert_eq!(err.position(), None);
    }
}
