use thiserror::Error;

/// Non-success HTTP statuses returned by the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorKind {
    NotFound,
    InternalError,
    Other(u16),
}

impl ServerErrorKind {
    pub fn from_status(code: u16) -> Self {
        match code {
            404 => ServerErrorKind::NotFound,
            500 => ServerErrorKind::InternalError,
            other => ServerErrorKind::Other(other),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ServerErrorKind::NotFound => 404,
            ServerErrorKind::InternalError => 500,
            ServerErrorKind::Other(code) => *code,
        }
    }
}

/// Everything that can abort a catalog run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded with status {}", .0.status_code())]
    Server(ServerErrorKind),
    #[error("malformed product data: {0}")]
    MalformedData(String),
    #[error("pipeline must be reset before it can run again")]
    NotIdle,
}

impl PipelineError {
    /// The one-line message shown to the user when a run fails.
    pub fn notification(&self) -> String {
        match self {
            PipelineError::Network(_) => "Please connect to internet".to_string(),
            PipelineError::Server(ServerErrorKind::NotFound) => {
                "Requested Page Not Found".to_string()
            }
            PipelineError::Server(ServerErrorKind::InternalError) => {
                "Something went wrong, try again later".to_string()
            }
            PipelineError::Server(ServerErrorKind::Other(code)) => {
                format!("Unexpected server response (status {})", code)
            }
            PipelineError::MalformedData(_) => "Received malformed product data".to_string(),
            PipelineError::NotIdle => "A calculation has already run, reset first".to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::MalformedData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServerErrorKind::from_status(404), ServerErrorKind::NotFound);
        assert_eq!(ServerErrorKind::from_status(500), ServerErrorKind::InternalError);
        // Anything else keeps its code
        assert_eq!(ServerErrorKind::from_status(503), ServerErrorKind::Other(503));
        assert_eq!(ServerErrorKind::from_status(418).status_code(), 418);
    }

    #[test]
    fn test_server_notifications() {
        assert_eq!(
            PipelineError::Server(ServerErrorKind::NotFound).notification(),
            "Requested Page Not Found"
        );
        assert_eq!(
            PipelineError::Server(ServerErrorKind::InternalError).notification(),
            "Something went wrong, try again later"
        );
        assert_eq!(
            PipelineError::Server(ServerErrorKind::Other(502)).notification(),
            "Unexpected server response (status 502)"
        );
    }

    #[test]
    fn test_json_error_is_malformed_data() {
        let err: PipelineError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, PipelineError::MalformedData(_)));
        assert_eq!(err.notification(), "Received malformed product data");
    }

    #[test]
    fn test_display_includes_status_code() {
        let err = PipelineError::Server(ServerErrorKind::InternalError);
        assert_eq!(err.to_string(), "server responded with status 500");
    }
}
