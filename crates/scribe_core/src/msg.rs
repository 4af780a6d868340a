use crate::{ChannelStatus, SubmissionId, TaskId};

/// Opaque upload payload.
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBlob")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Successful reply to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionReply {
    Transcribed {
        task_id: Option<TaskId>,
        text: String,
        locator: String,
    },
    /// The server stopped the task before producing a transcript.
    Cancelled {
        task_id: Option<TaskId>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFailure {
    pub status: Option<u16>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the form.
    SubmitClicked { file: FileBlob, language: String },
    /// User asked to cancel the current job.
    CancelClicked,
    /// User acknowledged the result and wants a fresh form.
    RepeatClicked,
    /// User asked to download the result.
    DownloadClicked,
    /// The upload request resolved.
    SubmissionResolved {
        submission_id: SubmissionId,
        result: Result<SubmissionReply, SubmissionFailure>,
    },
    /// Live channel reported progress for a task.
    ProgressReceived { task_id: TaskId, progress: u8 },
    /// Live channel acknowledged a cancellation request, naming the task
    /// when the frame did.
    CancelAcknowledged {
        task_id: Option<TaskId>,
        message: String,
    },
    /// Live channel reported a server-side error.
    ServerErrorReceived {
        task_id: Option<TaskId>,
        detail: String,
    },
    /// Live channel delivered a frame that could not be decoded.
    ProtocolErrorReceived { detail: String },
    /// Live channel connection state changed.
    ChannelStatusChanged {
        status: ChannelStatus,
        retry_count: u32,
    },
    /// The cancellation action resolved: `Ok` carries the server
    /// acknowledgment of an out-of-band request, `Err` the reason the
    /// action could not be carried out.
    CancelResolved {
        task_id: TaskId,
        result: Result<String, String>,
    },
}
