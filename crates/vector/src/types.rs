use serde::{Deserialize, Serialize, Serializer};

/// Value set accepted for `metadata.sex`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Gender,
}

impl Sex {
    pub const VARIANTS: [&'static str; 3] = ["male", "female", "gender"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "gender" => Some(Self::Gender),
            _ => None,
        }
    }
}

/// Metadata attached to every stored vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub category: String,
    pub year: i32,
    pub sex: Sex,
}

/// Validated write, resolved once into text or raw-vector mode
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    /// Text to be embedded by the index
    Text {
        id: String,
        text: String,
        metadata: Metadata,
    },

    /// Raw numeric vector, no embedding step
    Vector {
        id: String,
        vector: Vec<f32>,
        metadata: Metadata,
    },
}

impl WriteRequest {
    pub fn id(&self) -> &str {
        match self {
            Self::Text { id, .. } | Self::Vector { id, .. } => id,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Text { metadata, .. } | Self::Vector { metadata, .. } => metadata,
        }
    }

    /// Mode label used in logs
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Vector { .. } => "vector",
        }
    }

    /// Backend payload for this write
    pub fn into_payload(self) -> UpsertPayload {
        match self {
            Self::Text { id, text, metadata } => UpsertPayload::Data {
                id,
                data: text,
                metadata,
            },
            Self::Vector {
                id,
                vector,
                metadata,
            } => UpsertPayload::Vector {
                id,
                vector,
                metadata,
            },
        }
    }
}

/// Body of an upsert call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpsertPayload {
    Vector {
        id: String,
        vector: Vec<f32>,
        metadata: Metadata,
    },
    Data {
        id: String,
        data: String,
        metadata: Metadata,
    },
}

/// Result count accepted by the backend, kept as given (no rounding)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TopK(f64);

impl TopK {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Serialize for TopK {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// What a read searches with
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMode {
    /// Text embedded by the index
    Text(String),

    /// Raw numeric vector
    Vector(Vec<f32>),
}

/// Normalized read request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub mode: QueryMode,
    pub top_k: TopK,
    pub threshold: f64,
}

impl QueryRequest {
    /// Backend payload for this read
    pub fn to_payload(&self) -> QueryPayload {
        match &self.mode {
            QueryMode::Text(text) => QueryPayload {
                vector: None,
                data: Some(text.clone()),
                top_k: self.top_k,
                include_metadata: true,
                include_data: true,
                include_vectors: false,
            },
            QueryMode::Vector(vector) => QueryPayload {
                vector: Some(vector.clone()),
                data: None,
                top_k: self.top_k,
                include_metadata: true,
                include_data: false,
                include_vectors: false,
            },
        }
    }
}

/// Body of a query call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    pub top_k: TopK,

    pub include_metadata: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_data: bool,

    pub include_vectors: bool,
}

/// Ranked match returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Stored vector ID
    pub id: String,

    /// Similarity score, absent scores count as 0
    #[serde(default)]
    pub score: Option<f64>,

    /// Stored metadata, untyped since other writers may share the index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Raw data the vector was embedded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
}

impl Match {
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Fallbacks for read parameters, taken from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryDefaults {
    pub top_k: f64,
    pub max_top_k: f64,
    pub threshold: f64,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            top_k: 10.0,
            max_top_k: 100.0,
            threshold: 0.7,
        }
    }
}

impl QueryDefaults {
    pub fn from_config(config: &vecgate_common::AppConfig) -> Self {
        Self {
            top_k: f64::from(config.default_top_k),
            threshold: config.default_threshold,
            ..Self::default()
        }
    }
}
