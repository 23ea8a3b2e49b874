//! Shared HTTP plumbing for the external collaborators

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response, StatusCode};

use crate::{DishcastError, Result};

const USER_AGENT: &str = concat!("dishcast/", env!("CARGO_PKG_VERSION"));

/// Build a client with the configured timeout
pub fn build_client(timeout_seconds: u32) -> Result<Client> {
    build_client_with(timeout_seconds, |builder| builder)
}

/// Like [`build_client`], with extra builder settings applied last
pub fn build_client_with(
    timeout_seconds: u32,
    configure: impl FnOnce(ClientBuilder) -> ClientBuilder,
) -> Result<Client> {
    let builder = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT);
    configure(builder)
        .build()
        .map_err(|e| DishcastError::config(format!("Failed to create HTTP client: {e}")))
}

/// Turn a non-2xx response into a named API error
pub async fn ensure_success(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DishcastError::api(service, format!("credentials rejected ({status})"))
        }
        StatusCode::TOO_MANY_REQUESTS => DishcastError::api(service, "rate limit exceeded"),
        _ => DishcastError::api(service, format!("{status}: {}", truncate(&body, 200))),
    })
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
