//! vecgate vector request normalizer
//!
//! Validates writes, resolves read parameters, forwards to the
//! similarity-search backend and filters the ranked matches.

mod backend;
mod client;
mod filter;
mod params;
mod service;
mod types;
mod validate;

pub use backend::VectorBackend;
pub use client::{classify_error, UpstashVectorClient, EMBEDDER_REJECTION};
pub use filter::filter_by_threshold;
pub use params::{
    build_query_request, parse_threshold, parse_top_k, parse_vector_param, RawQueryParams,
    MISSING_QUERY_MESSAGE,
};
pub use service::{VectorService, MISSING_CREDENTIALS_MESSAGE};
pub use types::{
    Match, Metadata, QueryDefaults, QueryMode, QueryPayload, QueryRequest, Sex, TopK,
    UpsertPayload, WriteRequest,
};
pub use validate::{parse_write_body, validate_write_request, MAX_YEAR, MIN_YEAR};
