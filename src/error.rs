/// Engine-level errors
///
/// The assembler's primary path collapses gateway failures into the single
/// opaque `AssemblyFailed` before returning to callers; the finer-grained
/// variants exist for adapters and for logging at the failure site.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("Catalog gateway unreachable: {0}")]
    GatewayUnavailable(String),

    #[error("Catalog gateway rejected request with status {0}")]
    UpstreamRejected(u16),

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    #[error("Persistence error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Feed assembly failed")]
    AssemblyFailed,
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::MalformedResponse(err.to_string())
        } else {
            FeedError::GatewayUnavailable(err.to_string())
        }
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
