//! Shared HTTP plumbing for the remote content endpoints.

use std::time::Duration;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("space-facts-bot/", env!("CARGO_PKG_VERSION"));

/// Builds the client every endpoint talks through.
pub fn client() -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Returns the response unchanged on success, otherwise [`FetchError::Api`]
/// carrying the status and body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    if !resp.status().is_success() {
        return Err(FetchError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}
