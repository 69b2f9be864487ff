use thiserror::Error;

/// Everything that can abort a refresh cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("reference asset {0} has no usable usd price")]
    MissingReference(String),

    #[error("not ready yet")]
    NotReady,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
