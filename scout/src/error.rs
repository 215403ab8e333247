#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Upstream,
    NotFound,
    Io,
}

#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("failed to read PDF: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl ToolError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Upstream { .. } | Self::Decode(_) => ErrorKind::Upstream,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io(_) | Self::Http(_) | Self::Pdf(_) => ErrorKind::Io,
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        // undecodable bodies count as upstream failures
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<roxmltree::Error> for ToolError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_renders_message_only() {
        let err = ToolError::invalid_input("Invalid GitHub URL format");
        assert_eq!(err.to_string(), "Invalid GitHub URL format");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_kinds() {
        let upstream = ToolError::Upstream {
            status: 404,
            body: "{\"message\":\"Not Found\"}".to_string(),
        };
        assert_eq!(upstream.kind(), ErrorKind::Upstream);
        assert!(upstream.to_string().contains("Not Found"));

        assert_eq!(ToolError::not_found("paper").kind(), ErrorKind::NotFound);
        assert_eq!(
            ToolError::from(std::io::Error::other("disk full")).kind(),
            ErrorKind::Io
        );

        let decode: ToolError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(decode.kind(), ErrorKind::Upstream);
    }
}
