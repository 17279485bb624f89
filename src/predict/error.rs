use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("unknown service '{service}' (not in services database, not a port number)")]
    UnknownService { service: String },
    #[error("cannot resolve host '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("host '{0}' has no IPv4 address")]
    NoAddress(String),
    #[error("no reply to {0} within timeout")]
    Timeout(String),
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("reply to {0} is not valid UTF-8")]
    Decode(String),
    #[error("reply to {command} has {found} fields, expected {expected}")]
    Arity {
        command: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid {field} value '{value}'")]
    Field { field: &'static str, value: String },
}

impl PredictError {
    /// Resolution failures won't fix themselves between cycles.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PredictError::UnknownService { .. }
                | PredictError::Resolve { .. }
                | PredictError::NoAddress(_)
        )
    }
}
