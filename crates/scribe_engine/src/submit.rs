use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use scribe_logging::{scribe_debug, scribe_info, scribe_warn};
use serde::Deserialize;

use crate::{CancelReceipt, EngineConfig, FailureKind, SubmissionOutcome, SubmitError, Upload};

const TRANSCRIBE_PATH: &str = "/transcribe/";
const CANCEL_PATH: &str = "/cancel/";

/// The two request/response exchanges the client has with the server.
#[async_trait::async_trait]
pub trait TranscriptionApi: Send + Sync {
    /// `POST /transcribe/` with the file and language as multipart form data.
    async fn submit(&self, upload: Upload) -> Result<SubmissionOutcome, SubmitError>;

    /// `POST /cancel/{task_id}`.
    async fn cancel(&self, task_id: &str) -> Result<CancelReceipt, SubmitError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscribeReply {
    task_id: Option<String>,
    transcription: Option<String>,
    download_url: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CancelReply {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    detail: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    config: EngineConfig,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(config: EngineConfig) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| SubmitError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { config, client })
    }

    async fn post(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, SubmitError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl TranscriptionApi for ReqwestApi {
    async fn submit(&self, upload: Upload) -> Result<SubmissionOutcome, SubmitError> {
        let url = self.config.endpoint(TRANSCRIBE_PATH)?;
        scribe_info!(
            "Uploading {} ({} bytes, language {}) to {}",
            upload.file_name,
            upload.bytes.len(),
            upload.language_tag,
            url
        );

        let part = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name);
        let form = Form::new()
            .part("file", part)
            .text("language", upload.language_tag);
        let body = self.post(self.client.post(url).multipart(form)).await?;

        let reply: TranscribeReply = serde_json::from_slice(&body)
            .map_err(|err| SubmitError::new(FailureKind::InvalidResponse, err.to_string()))?;
        parse_transcribe_reply(reply)
    }

    async fn cancel(&self, task_id: &str) -> Result<CancelReceipt, SubmitError> {
        let mut url = self.config.endpoint(CANCEL_PATH)?;
        url.path_segments_mut()
            .map_err(|()| SubmitError::new(FailureKind::InvalidUrl, "server url cannot be a base"))?
            .pop_if_empty()
            .push(task_id);
        scribe_info!("Requesting cancellation of task {} at {}", task_id, url);

        let body = self.post(self.client.post(url)).await?;
        let reply: CancelReply = serde_json::from_slice(&body)
            .map_err(|err| SubmitError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(CancelReceipt {
            message: reply
                .message
                .unwrap_or_else(|| format!("Task {task_id} cancelled")),
        })
    }
}

fn parse_transcribe_reply(reply: TranscribeReply) -> Result<SubmissionOutcome, SubmitError> {
    if let Some(error) = reply.error {
        scribe_warn!("Server rejected upload: {}", error);
        return Err(SubmitError::new(FailureKind::Rejected, error));
    }
    match (reply.transcription, reply.download_url, reply.message) {
        (Some(transcription), Some(download_url), _) => {
            scribe_debug!(
                "Upload finished: task {:?}, {} chars",
                reply.task_id,
                transcription.len()
            );
            Ok(SubmissionOutcome::Transcribed {
                task_id: reply.task_id,
                transcription,
                download_url,
            })
        }
        (None, None, Some(message)) => Ok(SubmissionOutcome::Cancelled {
            task_id: reply.task_id,
            message,
        }),
        _ => Err(SubmitError::new(
            FailureKind::InvalidResponse,
            "reply has neither a transcription nor a message",
        )),
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> SubmitError {
    let message = serde_json::from_slice::<ErrorReply>(body)
        .ok()
        .and_then(|reply| reply.detail.or(reply.error))
        .unwrap_or_else(|| status.to_string());
    scribe_warn!("Request failed with {}: {}", status, message);
    SubmitError::new(FailureKind::HttpStatus(status.as_u16()), message)
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::new(FailureKind::Timeout, err.to_string());
    }
    SubmitError::new(FailureKind::Network, err.to_string())
}
