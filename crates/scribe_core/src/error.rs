/// A user intent the state machine refused without changing state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    #[error("unsupported language code '{code}'")]
    UnsupportedLanguage { code: String },
    #[error("the selected file is empty")]
    EmptyFile,
    #[error("a transcription is already in progress")]
    JobInProgress,
    #[error("no ongoing transcription task found")]
    NoActiveJob,
    #[error("no file available for download")]
    NoDownloadAvailable,
}
