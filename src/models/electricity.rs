use serde::{Deserialize, Serialize};

/// Success payload, `{"response": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of a 200 delete response.
///
/// A non-empty delete reports its count under the `error` key, an empty one
/// under `response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeleteResponse {
    Deleted { error: String },
    Nothing { response: String },
}
