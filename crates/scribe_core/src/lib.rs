//! Scribe core: pure job state machine and view-model helpers.
mod effect;
mod error;
mod job;
mod language;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{CancelMode, Effect};
pub use error::IntentError;
pub use job::{Job, Phase, SubmissionId, TaskId};
pub use language::LanguageTable;
pub use msg::{FileBlob, Msg, SubmissionFailure, SubmissionReply};
pub use state::{ClientSettings, ClientState};
pub use update::update;
pub use view_model::{ChannelStatus, JobView, Presenter};
