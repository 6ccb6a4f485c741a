use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    InvalidParameter(String),
    NotFound(String),
    ValidationError(String),
    SerializationError(String),
    DeserializationError(String),
    ParseError(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            CoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CoreError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            CoreError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            CoreError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            CoreError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Io => CoreError::SerializationError(err.to_string()),
            Category::Syntax | Category::Data | Category::Eof => {
                CoreError::DeserializationError(err.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
