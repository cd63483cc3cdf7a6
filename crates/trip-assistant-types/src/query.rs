/// The fixed session identifier sent with every query.
pub const DEMO_USER_ID: &str = "demo_user";

/// Body of `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QueryRequest {
    /// The user's utterance, already trimmed
    query: String,

    /// Session identifier, constant for the lifetime of a session
    user_id: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Reply body of `POST /query`.
///
/// Both fields are optional on the wire. The service answers `{"response": "..."}` on success
/// and `{"error": "..."}` when it rejects an empty query. Both fields are kept as raw JSON values
/// so that a malformed field degrades to "nothing usable" instead of failing the whole decode.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
}

impl QueryResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, text: &str) -> Self {
        self.response = Some(serde_json::Value::String(text.to_string()));
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(serde_json::Value::String(error.to_string()));
        self
    }

    /// The reply text, if the service sent a usable one.
    ///
    /// Only a non-empty JSON string counts. `null`, `""`, numbers and objects are all "no text".
    pub fn text(&self) -> Option<&str> {
        match &self.response {
            Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// The service's error message, if it sent one as a string.
    pub fn error(&self) -> Option<&str> {
        match &self.error {
            Some(serde_json::Value::String(error)) => Some(error),
            _ => None,
        }
    }
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Welcome {
    message: String,
}

impl Welcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
