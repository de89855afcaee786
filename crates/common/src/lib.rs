pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, RestCredentials};
pub use error::{EmbedOperation, FieldIssue, IssueCode, PathSegment, VecgateError};
pub type Result<T> = std::result::Result<T, VecgateError>;
