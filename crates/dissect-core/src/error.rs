//! Error types for the dissect-core library.

use thiserror::Error;

/// Main error type for the dissect library.
///
/// Evaluation itself never returns this type: expression and field problems are
/// reported on the result they belong to. It covers the fallible edges around
/// the engine (loading configuration, reading JSON inputs).
#[derive(Error, Debug)]
pub enum DissectError {
    /// Expression compilation error.
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Field rendering error.
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while compiling a simple expression or a raw regex.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// Placeholder name is empty, contains special characters, or is repeated.
    #[error("invalid placeholder name \"{name}\": {reason}")]
    InvalidPlaceholderName { name: String, reason: String },

    /// Placeholder body has no `:kind` part.
    #[error("placeholder \"{placeholder}\" must specify a name and a kind")]
    MissingPlaceholderKind { placeholder: String },

    /// Placeholder kind is not in the matcher table.
    #[error("unknown placeholder kind \"{0}\"")]
    UnknownPlaceholderKind(String),

    /// Placeholder argument is not accepted by its kind.
    #[error("invalid argument for {kind}: {reason}")]
    InvalidArgument { kind: String, reason: String },

    /// Input ended inside a placeholder.
    #[error("placeholder not terminated")]
    UnterminatedPlaceholder,

    /// The resulting (or user-supplied) regex does not compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
}

/// Errors raised while matching a compiled expression against page text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Compilation failed, so there was nothing to match with.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

/// Errors raised while rendering or converting a field value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Template refers to a name that is not in the render context.
    #[error("undefined variable \"{0}\"")]
    UndefinedVariable(String),

    /// Template uses a filter the renderer does not provide.
    #[error("unknown filter \"{0}\"")]
    UnknownFilter(String),

    /// Template is malformed.
    #[error("template syntax error: {0}")]
    Syntax(String),

    /// Template failed to render for another reason, such as a bad operand.
    #[error("template error: {0}")]
    Template(String),

    /// A filter could not parse its input.
    #[error("{filter}: cannot parse \"{value}\"")]
    Filter { filter: String, value: String },

    /// Rendered value does not convert to the field's data type.
    #[error("invalid {data_type}: {reason}")]
    Conversion { data_type: String, reason: String },
}

/// Result type for the dissect library.
pub type Result<T> = std::result::Result<T, DissectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_error_messages() {
        let err = ExpressionError::UnknownPlaceholderKind("date".to_string());
        assert_eq!(err.to_string(), "unknown placeholder kind \"date\"");

        let err = ExpressionError::UnterminatedPlaceholder;
        assert_eq!(err.to_string(), "placeholder not terminated");
    }

    #[test]
    fn test_evaluation_error_is_transparent() {
        let err: EvaluationError = ExpressionError::InvalidRegex("unclosed group".to_string()).into();
        assert_eq!(err.to_string(), "invalid regex: unclosed group");
    }
}
