//! Errors shared by decoding, normalization, lowering and resolution

use miette::Diagnostic;
use thiserror::Error;

/// The input document is not well-formed
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("malformed input document at line {line}, column {column}: {message}")]
#[diagnostic(code(decode::malformed))]
pub struct DecodeError {
    /// Parser message
    pub message: String,
    /// Line of the failure (1-based, 0 if unknown)
    pub line: usize,
    /// Column of the failure (1-based, 0 if unknown)
    pub column: usize,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// A node tree violates a shape the translation relies on
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum StructuralError {
    /// A top-level statement that is neither a function, a variable nor a comment
    #[error("unexpected top-level `{tag}` statement")]
    #[diagnostic(
        code(structure::unexpected_top_level),
        help("only functions, variable introductions and comments may appear at module level")
    )]
    UnexpectedTopLevel {
        /// Tag of the offending statement
        tag: &'static str,
    },

    /// A comment wrapper wrapping another comment wrapper
    #[error("comment wrapper nested directly inside another comment wrapper")]
    #[diagnostic(code(structure::nested_comment))]
    NestedComment,

    /// The fields present on a node do not match its tag
    #[error("`{tag}` node has a mismatched payload: {detail}")]
    #[diagnostic(code(structure::payload_mismatch))]
    PayloadMismatch {
        /// Node tag
        tag: String,
        /// What was missing or superfluous
        detail: String,
    },

    /// `x instanceof alias.Type` where `alias` names no known module
    #[error("cannot resolve qualified type reference `{alias}.{name}`")]
    #[diagnostic(
        code(structure::unresolved_type),
        help("the alias must name an imported module that is part of this project")
    )]
    UnresolvedTypeReference {
        /// Module alias
        alias: String,
        /// Type name
        name: String,
    },

    /// `x instanceof <expr>` with an operand that is no type reference
    #[error("unsupported `{tag}` operand on the right of a type check")]
    #[diagnostic(code(structure::type_check_operand))]
    UnsupportedTypeCheckOperand {
        /// Tag of the operand
        tag: &'static str,
    },

    /// A qualified type reference left unresolved after the resolution pass
    #[error("qualified type reference `{alias}.{name}` was never resolved")]
    #[diagnostic(code(structure::pending_type))]
    PendingTypeReference {
        /// Module alias
        alias: String,
        /// Type name
        name: String,
    },
}

/// A construct the translation has no mapping for
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum UnsupportedConstructError {
    /// Unrecognized node tag
    #[error("unrecognized node tag `{tag}`{}", below(.parent))]
    #[diagnostic(code(unsupported::tag))]
    UnknownTag {
        /// The tag
        tag: String,
        /// Tag of the enclosing node, if any
        parent: Option<String>,
    },

    /// Unrecognized prefix operator name
    #[error("unrecognized unary operator `{op}`")]
    #[diagnostic(code(unsupported::unary_op))]
    UnknownUnaryOperator {
        /// The operator name
        op: String,
    },

    /// Unrecognized infix operator name
    #[error("unrecognized binary operator `{op}`")]
    #[diagnostic(code(unsupported::binary_op))]
    UnknownBinaryOperator {
        /// The operator name
        op: String,
    },
}

fn below(parent: &Option<String>) -> String {
    parent
        .as_ref()
        .map(|parent| format!(" below `{parent}`"))
        .unwrap_or_default()
}

/// Any failure while translating one module
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum TranslateError {
    /// Malformed input
    #[error(transparent)]
    #[diagnostic(transparent)]
    Decode(#[from] DecodeError),

    /// Structural violation
    #[error(transparent)]
    #[diagnostic(transparent)]
    Structural(#[from] StructuralError),

    /// Unsupported construct
    #[error(transparent)]
    #[diagnostic(transparent)]
    Unsupported(#[from] UnsupportedConstructError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_mentions_parent() {
        let err = UnsupportedConstructError::UnknownTag {
            tag: "Yield".to_string(),
            parent: Some("Block".to_string()),
        };
        assert_eq!(err.to_string(), "unrecognized node tag `Yield` below `Block`");

        let err = UnsupportedConstructError::UnknownTag {
            tag: "Yield".to_string(),
            parent: None,
        };
        assert_eq!(err.to_string(), "unrecognized node tag `Yield`");
    }

    #[test]
    fn test_translate_error_is_transparent() {
        let err = TranslateError::from(StructuralError::NestedComment);
        assert_eq!(
            err.to_string(),
            "comment wrapper nested directly inside another comment wrapper"
        );
    }
}
