//! Client side of the reload signal route.
//!
//! A build subprocess calls this once after writing its outputs. One attempt,
//! no retry: a missed signal is recovered by the next change.

use std::time::Duration;

use crate::error::SignalError;

/// Upper bound so a wedged server can't hang the build process.
const SIGNAL_TIMEOUT: Duration = Duration::from_secs(5);

/// POST to the signal route of the serving process.
pub async fn send_reload_signal(url: &str) -> Result<(), SignalError> {
    let client = reqwest::Client::builder()
        .timeout(SIGNAL_TIMEOUT)
        .build()
        .map_err(|source| SignalError::Request {
            url: url.to_string(),
            source,
        })?;

    let response = client
        .post(url)
        .send()
        .await
        .map_err(|source| SignalError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SignalError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    tracing::debug!(url, "reload signal delivered");
    Ok(())
}
