//! Ticket ingestion client (`POST /api/upload`).
//!
//! Uploads a JSON/CSV ticket export as multipart form data. The file body is
//! streamed in chunks so the caller can observe an opaque 0–100 progress
//! signal; progress delivery is best-effort and never blocks the upload.

use std::convert::Infallible;
use std::path::Path;

use futures_util::stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::services::shared::{
    ServiceError, ServiceResult, build_http_client, classify_reqwest_error, decode_json,
};

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Response of the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tickets_processed: u64,
}

/// Best-effort sender for the 0–100 upload progress signal.
///
/// A full channel drops the tick rather than stalling the transfer; 100 is
/// only reported once the backend has confirmed the upload.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<u8>,
}

impl ProgressSender {
    pub fn send(&self, percent: u8) {
        let _ = self.tx.try_send(percent.min(100));
    }
}

/// Creates a progress channel pair for [`IngestClient::upload_document`].
pub fn progress_channel() -> (ProgressSender, mpsc::Receiver<u8>) {
    let (tx, rx) = mpsc::channel(128);
    (ProgressSender { tx }, rx)
}

/// HTTP client for the ingestion endpoint.
pub struct IngestClient {
    http: reqwest::Client,
    base_url: String,
}

impl IngestClient {
    /// Creates a client from resolved connection settings.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot be resolved.
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        let base_url = crate::services::resolve_base_url(
            config.base_url.as_deref(),
            crate::config::BASE_URL_ENV_VAR,
        )?;
        Ok(Self {
            http: build_http_client(config.timeout()),
            base_url,
        })
    }

    /// Uploads a ticket export for indexing.
    ///
    /// Unsupported extensions are rejected client-side before any request is
    /// made, mirroring the backend's own validation.
    ///
    /// # Errors
    /// Returns a `ServiceError` for invalid input, transport failures, error
    /// statuses (with the backend's `detail` when present), and undecodable
    /// bodies.
    pub async fn upload_document(
        &self,
        file: &Path,
        progress: Option<ProgressSender>,
    ) -> ServiceResult<UploadOutcome> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = mime_for(&file_name)?;

        let bytes = tokio::fs::read(file).await.map_err(|e| {
            ServiceError::invalid_input(format!("Failed to read {}: {e}", file.display()))
        })?;
        debug!(file = %file.display(), size = bytes.len(), "uploading ticket export");

        if let Some(progress) = &progress {
            progress.send(0);
        }

        let length = bytes.len() as u64;
        let total = bytes.len().max(1);
        let ticker = progress.clone();
        let mut sent = 0_usize;
        let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let body = reqwest::Body::wrap_stream(stream::iter(chunks.into_iter().map(
            move |chunk| {
                sent += chunk.len();
                if let Some(ticker) = &ticker {
                    // Cap at 99 until the backend confirms.
                    let percent = (sent * 100 / total).min(99) as u8;
                    ticker.send(percent);
                }
                Ok::<_, Infallible>(chunk)
            },
        )));

        let part = reqwest::multipart::Part::stream_with_length(body, length)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ServiceError::parse(format!("Invalid mime type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/api/upload", self.base_url);
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let outcome: UploadOutcome = decode_json(response).await?;

        if let Some(progress) = &progress {
            progress.send(100);
        }
        Ok(outcome)
    }
}

fn mime_for(file_name: &str) -> ServiceResult<&'static str> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".json") {
        Ok("application/json")
    } else if lower.ends_with(".csv") {
        Ok("text/csv")
    } else {
        Err(ServiceError::invalid_input(
            "Please upload a JSON or CSV file",
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::services::shared::ServiceErrorKind;

    fn client_for(server: &MockServer) -> IngestClient {
        IngestClient::new(&ServiceConfig {
            base_url: Some(server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn temp_export(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("tickets")
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected_without_a_request() {
        let server = MockServer::start().await;
        // No mock mounted: a request would 404 and fail differently.
        let file = temp_export(".txt", b"nope");

        let err = client_for(&server)
            .upload_document(file.path(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ServiceErrorKind::InvalidInput);
        assert_eq!(err.message, "Please upload a JSON or CSV file");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_decodes_outcome_and_completes_progress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Successfully processed 42 tickets",
                "tickets_processed": 42
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = temp_export(".json", br#"{"tickets": []}"#);
        let (sender, mut receiver) = progress_channel();

        let outcome = client_for(&server)
            .upload_document(file.path(), Some(sender))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.tickets_processed, 42);

        let mut ticks = Vec::new();
        while let Ok(tick) = receiver.try_recv() {
            ticks.push(tick);
        }
        assert_eq!(ticks.first(), Some(&0));
        assert_eq!(ticks.last(), Some(&100));
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_upload_failure_carries_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"detail": "Invalid JSON format: expected value"}),
            ))
            .mount(&server)
            .await;

        let file = temp_export(".json", b"not json");
        let err = client_for(&server)
            .upload_document(file.path(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ServiceErrorKind::ApiError);
        assert_eq!(err.message, "Invalid JSON format: expected value");
    }

    #[tokio::test]
    async fn test_csv_uploads_are_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "ok", "tickets_processed": 1
            })))
            .mount(&server)
            .await;

        let file = temp_export(".csv", b"id,query,resolution\n1,a,b\n");
        let outcome = client_for(&server)
            .upload_document(file.path(), None)
            .await
            .unwrap();
        assert!(outcome.success);
    }
}
