use std::sync::{mpsc, Arc};
use std::thread;

use scribe_logging::scribe_warn;

use crate::channel::{ChannelSettings, LiveChannel};
use crate::submit::{ReqwestApi, TranscriptionApi};
use crate::{
    ChannelError, ChannelSnapshot, EngineConfig, EngineError, EngineEvent, OutboundFrame,
    SubmissionId, Upload,
};

/// Receives everything the engine reports, from whichever thread it runs on.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

enum EngineCommand {
    Submit {
        submission_id: SubmissionId,
        upload: Upload,
    },
    Cancel {
        task_id: String,
    },
}

/// Owns the async runtime and exposes the engine to synchronous callers.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    channel: LiveChannel,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestApi::new(config.clone())?);
        Self::with_api(config, api, sink)
    }

    pub fn with_api(
        config: EngineConfig,
        api: Arc<dyn TranscriptionApi>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let settings = ChannelSettings::from_config(&config)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let channel = LiveChannel::new(settings, sink.clone(), runtime.handle().clone());

        let (cmd_tx, cmd_rx) = mpsc::channel();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, sink.as_ref()).await;
                });
            }
        });

        Ok(Self { cmd_tx, channel })
    }

    pub fn connect(&self) {
        self.channel.connect();
    }

    pub fn channel_snapshot(&self) -> ChannelSnapshot {
        self.channel.snapshot()
    }

    pub fn submit(&self, submission_id: SubmissionId, upload: Upload) {
        self.dispatch(EngineCommand::Submit {
            submission_id,
            upload,
        });
    }

    pub fn cancel(&self, task_id: impl Into<String>) {
        self.dispatch(EngineCommand::Cancel {
            task_id: task_id.into(),
        });
    }

    pub fn send(&self, frame: &OutboundFrame) -> Result<(), ChannelError> {
        self.channel.send(frame)
    }

    fn dispatch(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            scribe_warn!("Engine worker has stopped; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.channel.shutdown();
    }
}

async fn handle_command(api: &dyn TranscriptionApi, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Submit {
            submission_id,
            upload,
        } => {
            let result = api.submit(upload).await;
            sink.emit(EngineEvent::SubmissionFinished {
                submission_id,
                result,
            });
        }
        EngineCommand::Cancel { task_id } => {
            let result = api.cancel(&task_id).await;
            sink.emit(EngineEvent::CancelFinished { task_id, result });
        }
    }
}
