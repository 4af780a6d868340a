use std::sync::mpsc;

use scribe_core::{ChannelStatus, Effect, Msg, SubmissionFailure, SubmissionReply, TaskId};
use scribe_engine::{
    ChannelEvent, EngineConfig, EngineEvent, EngineHandle, EventSink, OutboundFrame,
    SubmissionOutcome, SubmitError, Upload,
};
use scribe_logging::{scribe_debug, scribe_info, scribe_warn};
use url::Url;

use super::app::AppEvent;

/// Executes core effects that leave the process: uploads, cancellations and
/// downloads. Render effects are handled by the caller.
pub struct EffectRunner {
    engine: EngineHandle,
    server_url: String,
    open_downloads: bool,
    events: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        config: &EngineConfig,
        open_downloads: bool,
        events: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            engine,
            server_url: config.server_url.clone(),
            open_downloads,
            events,
        }
    }

    pub fn connect(&self) {
        self.engine.connect();
    }

    /// Runs one effect. Returns the absolute download URL for `OpenDownload`.
    pub fn run(&self, effect: Effect) -> Option<String> {
        match effect {
            Effect::Submit {
                submission_id,
                file,
                language_tag,
            } => {
                scribe_info!(
                    "Submitting {} ({} bytes) as {} [submission {}]",
                    file.name,
                    file.bytes.len(),
                    language_tag,
                    submission_id
                );
                self.engine
                    .submit(submission_id, Upload::new(file.name, file.bytes, language_tag));
            }
            Effect::CancelOutOfBand { task_id } => {
                scribe_info!("Requesting cancellation of {} out of band", task_id);
                self.engine.cancel(task_id.as_str());
            }
            Effect::CancelOverChannel { task_id } => {
                scribe_info!("Requesting cancellation of {} over the channel", task_id);
                let frame = OutboundFrame::CancelTask {
                    task_id: task_id.as_str().to_string(),
                };
                if let Err(err) = self.engine.send(&frame) {
                    scribe_warn!("Cancel frame for {} not sent: {}", task_id, err);
                    let _ = self.events.send(AppEvent::Core(Msg::CancelResolved {
                        task_id,
                        result: Err(err.to_string()),
                    }));
                }
            }
            Effect::OpenDownload { locator } => return Some(self.open_download(&locator)),
            Effect::StateChanged(_) | Effect::Rejected(_) => {
                scribe_debug!("Render effect reached the effect runner; ignored");
            }
        }
        None
    }

    fn open_download(&self, locator: &str) -> String {
        let target = resolve_locator(&self.server_url, locator);
        if self.open_downloads {
            if let Err(err) = open::that(&target) {
                scribe_warn!("Could not open {}: {}", target, err);
            }
        }
        target
    }
}

/// Resolves a result locator against the server origin. Absolute locators
/// pass through untouched.
pub fn resolve_locator(server_url: &str, locator: &str) -> String {
    match Url::parse(server_url).and_then(|base| base.join(locator)) {
        Ok(url) => url.to_string(),
        Err(_) => locator.to_string(),
    }
}

/// Forwards engine events into the application queue as core messages.
pub struct MsgSink {
    events: mpsc::Sender<AppEvent>,
}

impl MsgSink {
    pub fn new(events: mpsc::Sender<AppEvent>) -> Self {
        Self { events }
    }
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let msg = engine_event_to_msg(event);
        if self.events.send(AppEvent::Core(msg)).is_err() {
            scribe_debug!("Application queue closed; engine event dropped");
        }
    }
}

pub fn engine_event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Channel(event) => channel_event_to_msg(event),
        EngineEvent::SubmissionFinished {
            submission_id,
            result,
        } => Msg::SubmissionResolved {
            submission_id,
            result: result.map(map_outcome).map_err(map_failure),
        },
        EngineEvent::CancelFinished { task_id, result } => Msg::CancelResolved {
            task_id: TaskId::new(task_id),
            result: result
                .map(|receipt| receipt.message)
                .map_err(|err| err.to_string()),
        },
    }
}

fn channel_event_to_msg(event: ChannelEvent) -> Msg {
    match event {
        ChannelEvent::Progress { task_id, progress } => Msg::ProgressReceived {
            task_id: TaskId::new(task_id),
            progress,
        },
        ChannelEvent::CancelAck { task_id, message } => Msg::CancelAcknowledged {
            task_id: task_id.map(TaskId::new),
            message,
        },
        ChannelEvent::Error { task_id, detail } => Msg::ServerErrorReceived {
            task_id: task_id.map(TaskId::new),
            detail,
        },
        ChannelEvent::ProtocolError { detail } => Msg::ProtocolErrorReceived { detail },
        ChannelEvent::Connecting { retry_count } => Msg::ChannelStatusChanged {
            status: ChannelStatus::Connecting,
            retry_count,
        },
        ChannelEvent::Connected => Msg::ChannelStatusChanged {
            status: ChannelStatus::Connected,
            retry_count: 0,
        },
        ChannelEvent::Disconnected {
            reason,
            retry_count,
        } => {
            scribe_debug!("Channel disconnect forwarded ({}), retry {}", reason, retry_count);
            Msg::ChannelStatusChanged {
                status: ChannelStatus::Disconnected,
                retry_count,
            }
        }
    }
}

fn map_outcome(outcome: SubmissionOutcome) -> SubmissionReply {
    match outcome {
        SubmissionOutcome::Transcribed {
            task_id,
            transcription,
            download_url,
        } => SubmissionReply::Transcribed {
            task_id: task_id.map(TaskId::new),
            text: transcription,
            locator: download_url,
        },
        SubmissionOutcome::Cancelled { task_id, message } => SubmissionReply::Cancelled {
            task_id: task_id.map(TaskId::new),
            message,
        },
    }
}

fn map_failure(err: SubmitError) -> SubmissionFailure {
    let detail = if err.message.is_empty() {
        err.kind.to_string()
    } else {
        err.message.clone()
    };
    SubmissionFailure {
        status: err.status(),
        detail,
    }
}
