use crate::{FileBlob, IntentError, JobView, SubmissionId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upload `file` and start transcription.
    Submit {
        submission_id: SubmissionId,
        file: FileBlob,
        language_tag: String,
    },
    /// Request cancellation with `POST /cancel/{task_id}`.
    CancelOutOfBand { task_id: TaskId },
    /// Request cancellation with a `cancelTask` frame on the live channel.
    CancelOverChannel { task_id: TaskId },
    /// Hand the result locator to the presentation layer for download.
    OpenDownload { locator: String },
    /// The job changed; render it.
    StateChanged(JobView),
    /// An intent was refused; state is unchanged.
    Rejected(IntentError),
}

/// How the cancellation coordinator reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelMode {
    OutOfBand,
    #[default]
    OverChannel,
}
