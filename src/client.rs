//! Client for submitting frames to a running advisor

use std::path::Path;
use std::time::Duration;

use base64::Engine;

use crate::api::{AdviceRequest, AdviceResponse};
use crate::{Error, Result};

/// HTTP client for the `/generate` endpoint
#[derive(Debug, Clone)]
pub struct SubmitClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SubmitClient {
    /// Create a client for a server base URL (e.g. `http://127.0.0.1:8000`)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(server: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}/generate", server.trim_end_matches('/')),
        })
    }

    /// Submit one frame for a session
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the server rejects it
    pub async fn submit(&self, session_id: &str, img: String) -> Result<AdviceResponse> {
        let request = AdviceRequest {
            session_id: session_id.to_string(),
            img,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

/// Read an image file into a `data:<mime>;base64,...` URI
///
/// # Errors
///
/// Returns error if the file cannot be read
pub fn encode_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("empty file: {}", path.display()),
        )));
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{encoded}", mime_for_path(path)))
}

/// Guess an image MIME type from the file extension
fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
