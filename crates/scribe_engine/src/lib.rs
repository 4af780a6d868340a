//! Scribe engine: live channel, upload requests and effect execution.
mod backoff;
mod channel;
mod config;
mod engine;
mod frame;
mod submit;
mod types;

pub use backoff::ReconnectPolicy;
pub use channel::{ChannelSettings, LiveChannel};
pub use config::EngineConfig;
pub use engine::{EngineHandle, EventSink};
pub use frame::{decode_frame, encode_frame, FrameError, CANCEL_ACK_MARKER};
pub use submit::{ReqwestApi, TranscriptionApi};
pub use types::{
    CancelReceipt, ChannelError, ChannelEvent, ChannelSnapshot, ChannelStatus, EngineError,
    EngineEvent, FailureKind, OutboundFrame, SubmissionId, SubmissionOutcome, SubmitError, Upload,
};
