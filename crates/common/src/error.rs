use serde::Serialize;
use std::fmt;

/// Remediation shown to callers when the index has no embedding model
pub const EMBEDDER_HINT: &str =
    "Upstash Console → Vector → select the index → Settings, then choose an embedding model";

/// One segment of the path to an offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Kind of constraint a field violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    TooSmall,
    TooBig,
    NotInteger,
    InvalidEnumValue,
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub path: Vec<PathSegment>,
    pub code: IssueCode,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: Vec<PathSegment>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
        }
    }

    /// Dotted rendering of the path, e.g. `metadata.year` or `vector[2]`
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(i) => out.push_str(&format!("[{}]", i)),
            }
        }
        out
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}

/// Backend operation that needed an embedding model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOperation {
    Upsert,
    Query,
}

impl fmt::Display for EmbedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upsert => f.write_str("upsert"),
            Self::Query => f.write_str("query"),
        }
    }
}

/// vecgate error types
#[derive(Debug, thiserror::Error)]
pub enum VecgateError {
    /// Request body failed schema validation
    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<FieldIssue>),

    /// Request body was not parseable JSON
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Request body exceeded the configured limit
    #[error("Payload too large: limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Neither of the alternative query parameters was supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Numeric vector parameter contained no usable numbers
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The index rejected raw data because it has no embedding model
    #[error("Embedder not configured for {0}")]
    EmbedderNotConfigured(EmbedOperation),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend credentials missing or backend unreachable
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend answered with an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// A third-party HTTP API answered with a non-success status
    #[error("Upstream error ({status}): {details}")]
    Upstream { status: u16, details: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl VecgateError {
    /// Create malformed input error
    pub fn malformed_input<S: Into<String>>(msg: S) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create missing parameter error
    pub fn missing_parameter<S: Into<String>>(msg: S) -> Self {
        Self::MissingParameter(msg.into())
    }

    /// Create invalid vector error
    pub fn invalid_vector<S: Into<String>>(msg: S) -> Self {
        Self::InvalidVector(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create backend unavailable error
    pub fn backend_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create upstream error
    pub fn upstream<S: Into<String>>(status: u16, details: S) -> Self {
        Self::Upstream {
            status,
            details: details.into(),
        }
    }
}

// HTTP response conversion
impl VecgateError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::MalformedInput(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::MissingParameter(_) => 400,
            Self::InvalidVector(_) => 400,
            Self::InvalidInput(_) => 400,
            Self::EmbedderNotConfigured(_) => 400,
            Self::NotFound(_) => 404,
            Self::BackendUnavailable(_) => 500,
            Self::Backend(_) => 500,
            Self::Upstream { status, .. } => *status,
            Self::Config(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 500,
            Self::Other(_) => 500,
        }
    }

    /// Stable machine-checkable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::MalformedInput(_) => "INVALID_JSON",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::MissingParameter(_) => "MISSING_PARAMETER",
            Self::InvalidVector(_) => "INVALID_VECTOR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::EmbedderNotConfigured(_) => "EMBEDDER_NOT_CONFIGURED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Self::Backend(_) => "BACKEND_FAILURE",
            Self::Upstream { .. } => "UPSTREAM_FAILURE",
            Self::Config(_) => "CONFIG",
            Self::Io(_) | Self::Json(_) | Self::Other(_) => "INTERNAL",
        }
    }

    /// Caller-facing message; backend details travel separately
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(_) => "invalid request".to_string(),
            Self::MalformedInput(_) => "invalid JSON".to_string(),
            Self::PayloadTooLarge(limit) => format!("request body exceeds {} bytes", limit),
            Self::MissingParameter(msg) => msg.clone(),
            Self::InvalidVector(_) => "invalid vector".to_string(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::EmbedderNotConfigured(EmbedOperation::Upsert) => {
                "The index has no embedding model, so text cannot be stored as data. Configure an embedder for the index."
                    .to_string()
            }
            Self::EmbedderNotConfigured(EmbedOperation::Query) => {
                "The index has no embedding model, so text queries are not possible. Configure an embedder for the index."
                    .to_string()
            }
            Self::NotFound(msg) => msg.clone(),
            Self::BackendUnavailable(msg) => msg.clone(),
            Self::Backend(_) => "backend request failed".to_string(),
            Self::Upstream { .. } => "upstream request failed".to_string(),
            Self::Config(msg) => msg.clone(),
            Self::Io(_) | Self::Json(_) | Self::Other(_) => "internal server error".to_string(),
        }
    }

    /// Remediation guidance, when there is one
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EmbedderNotConfigured(_) => Some(EMBEDDER_HINT),
            _ => None,
        }
    }

    /// Field issues for validation failures
    pub fn issues(&self) -> Option<&[FieldIssue]> {
        match self {
            Self::Validation(issues) => Some(issues),
            _ => None,
        }
    }
}
