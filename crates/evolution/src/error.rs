use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Instance not found: {0}")]
    NotFound(String),

    #[error("Instance already exists: {0}")]
    AlreadyExists(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e)
        }
    }
}

impl ApiError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Auth(_) => "The integration API rejected the API key.",
            ApiError::NotFound(_) => "The WhatsApp instance does not exist yet.",
            ApiError::AlreadyExists(_) => "An instance with this name already exists.",
            ApiError::Network(_) => "Network error. Check your connection.",
            ApiError::Decode(_) => "The integration API sent an unexpected response.",
            ApiError::Api { .. } => "Server error. Please try again later.",
            ApiError::Timeout(_) => "Request timed out. Please try again.",
            ApiError::NotConfigured(_) => "The WhatsApp integration is not configured.",
        }
    }

    /// Friendly text followed by the raw cause, as shown on the connection card.
    pub fn session_message(&self) -> String {
        format!("{} ({self})", self.user_message())
    }

    /// Classifies a non-success HTTP response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        let lowered = message.to_lowercase();
        match status {
            401 => ApiError::Auth(message),
            404 => ApiError::NotFound(message),
            403 | 409 if lowered.contains("already in use") || lowered.contains("already exists") => {
                ApiError::AlreadyExists(message)
            }
            _ => ApiError::Api { status, message },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// Error bodies look like {"status":403,"error":"Forbidden","response":{"message":["..."]}}
fn extract_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let candidates = [
        value.pointer("/response/message"),
        value.get("message"),
        value.get("error"),
    ];

    for candidate in candidates.into_iter().flatten() {
        match candidate {
            serde_json::Value::String(s) if !s.is_empty() => return s.clone(),
            serde_json::Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                if !parts.is_empty() {
                    return parts.join("; ");
                }
            }
            _ => {}
        }
    }

    body.trim().to_string()
}
