//! Shared reqwest plumbing for the remote services.

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ScanError;

/// Build a blocking client with the configured timeouts.
pub fn build_client(config: &ClientConfig) -> Result<Client, ScanError> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ScanError::Transport(e.to_string()))
}

/// Decode a JSON body, turning non-2xx statuses into `RemoteRejection`.
pub fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ScanError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScanError::RemoteRejection {
            code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("").to_string(),
        });
    }
    response
        .json::<T>()
        .map_err(|e| ScanError::MalformedResponse(e.to_string()))
}

/// Map a send error to the transport variant.
pub fn send_error(e: reqwest::Error) -> ScanError {
    if e.is_timeout() {
        ScanError::Transport(format!("request timed out: {}", e))
    } else {
        ScanError::Transport(e.to_string())
    }
}
