use thiserror::Error;

/// Failure of a remote fetch. Every asynchronous boundary returns this.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout or an undecodable body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("server responded with {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {message}")]
    InvalidUrl { name: &'static str, message: String },

    #[error("{name} must be a whole number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {category} name {name:?}")]
    DuplicateName { category: &'static str, name: String },
}
