use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("invalid pattern segment {segment:?}: {reason}")]
    InvalidPattern { segment: String, reason: String },

    #[error("invalid percent-encoding in {0:?}")]
    InvalidEncoding(String),

    #[error("cannot resolve a path against a {0}")]
    NotAContainer(&'static str),

    #[error("invalid array index: {0:?}")]
    InvalidIndex(String),

    #[error("query is not a plain path: {0}")]
    NotAPath(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("render error: {0}")]
    Render(String),
}

impl TreeError {
    pub(crate) fn pattern(segment: &str, reason: impl Into<String>) -> Self {
        TreeError::InvalidPattern {
            segment: segment.to_string(),
            reason: reason.into(),
        }
    }
}
