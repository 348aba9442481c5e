use crate::node::NodeKind;

/// Error type for preset and condition parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// No condition provider registered under this key
    UnknownKey { key: String },

    /// Node shape does not match the provider's expected kind
    WrongNodeKind { key: String, expected: NodeKind, found: NodeKind },

    /// Field authored but unparsable
    InvalidValue { value: String, details: String },

    /// Structurally required field missing
    MissingField { field: String },

    /// External item reference with an unregistered prefix
    InvalidPrefix { prefix: String },

    /// External item id unknown to its provider
    UnknownExternalItem { prefix: String, id: String },

    /// Formula failed to compile
    Expression { expression: String, details: String },

    /// Inner failure wrapped with the key it occurred under, so errors
    /// accumulate a path-like trail
    Failed { key: String, source: Box<ParseError> },
}

impl ParseError {
    /// Wraps this error with the key under which it occurred.
    pub fn under(self, key: &str) -> ParseError {
        ParseError::Failed {
            key: key.to_string(),
            source: Box::new(self),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnknownKey { key } => {
                write!(f, "Invalid property '{}'", key)
            }
            ParseError::WrongNodeKind { key, expected, found } => {
                write!(f, "Invalid property type '{}' for '{}', expected {}", found, key, expected)
            }
            ParseError::InvalidValue { value, details } => {
                write!(f, "Invalid value '{}': {}", value, details)
            }
            ParseError::MissingField { field } => {
                write!(f, "Missing required field '{}'", field)
            }
            ParseError::InvalidPrefix { prefix } => {
                write!(f, "Invalid prefix '{}'", prefix)
            }
            ParseError::UnknownExternalItem { prefix, id } => {
                write!(f, "External item '{}' doesn't exist for provider '{}'", id, prefix)
            }
            ParseError::Expression { expression, details } => {
                write!(f, "Failed to compile expression '{}': {}", expression, details)
            }
            ParseError::Failed { key, source } => {
                write!(f, "Failed to parse '{}': {}", key, source)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Failed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

// Type alias for Result with ParseError
pub type ParseResult<T> = Result<T, ParseError>;
