use std::fmt;

use bytes::Bytes;

/// Local correlation number for one upload request.
pub type SubmissionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSnapshot {
    pub status: ChannelStatus,
    /// Attempts since the last successful connect.
    pub retry_count: u32,
}

/// Typed inbound events of the live channel, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Progress { task_id: String, progress: u8 },
    /// `task_id` comes from the frame or, failing that, the ack text.
    CancelAck {
        task_id: Option<String>,
        message: String,
    },
    Error {
        task_id: Option<String>,
        detail: String,
    },
    /// A connection attempt is starting.
    Connecting { retry_count: u32 },
    Connected,
    Disconnected { reason: String, retry_count: u32 },
    ProtocolError { detail: String },
}

/// Outbound frames understood by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    CancelTask { task_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Channel(ChannelEvent),
    SubmissionFinished {
        submission_id: SubmissionId,
        result: Result<SubmissionOutcome, SubmitError>,
    },
    CancelFinished {
        task_id: String,
        result: Result<CancelReceipt, SubmitError>,
    },
}

/// The file and language of one transcription request.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
    pub language_tag: String,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        language_tag: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            language_tag: language_tag.into(),
        }
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .field("language_tag", &self.language_tag)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Transcribed {
        task_id: Option<String>,
        transcription: String,
        download_url: String,
    },
    Cancelled {
        task_id: Option<String>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReceipt {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SubmitError {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmitError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The reply body was not the JSON we expect.
    InvalidResponse,
    /// The server answered 2xx with an `error` body.
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Rejected => write!(f, "rejected by server"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel not ready (status {status:?})")]
    NotReady { status: ChannelStatus },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("invalid engine configuration: {0}")]
    Config(#[from] SubmitError),
}
