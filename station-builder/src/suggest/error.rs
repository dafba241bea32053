//! Suggestion endpoint error types.

/// Errors that can occur when querying the suggestion endpoint.
///
/// These never leave the client through `SuggestionSource`; they are logged
/// and turned into an empty result there.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Payload was not the expected JSON, even after unwrapping
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SuggestError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = SuggestError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value");
    }
}
