//! Reconnecting websocket connection to the server's live channel.
//!
//! A single supervisor task owns the socket. It connects, pumps frames in
//! both directions until the connection ends, reports the disconnect and
//! then waits for the reconnect delay (or an explicit [`LiveChannel::connect`])
//! before trying again. It only stops on [`LiveChannel::shutdown`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use scribe_logging::{scribe_debug, scribe_info, scribe_warn};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use crate::backoff::ReconnectPolicy;
use crate::frame::{decode_frame, encode_frame};
use crate::{
    ChannelError, ChannelEvent, ChannelSnapshot, ChannelStatus, EngineConfig, EngineEvent,
    EventSink, OutboundFrame, SubmitError,
};

/// Floor for the ping period; a zero interval would panic in tokio.
const MIN_HEARTBEAT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub url: String,
    pub connect_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub reconnect: ReconnectPolicy,
}

impl ChannelSettings {
    pub fn from_config(config: &EngineConfig) -> Result<Self, SubmitError> {
        Ok(Self {
            url: config.channel_url()?.to_string(),
            connect_timeout: config.connect_timeout,
            heartbeat_interval: config.heartbeat_interval,
            reconnect: config.reconnect,
        })
    }
}

#[derive(Clone)]
pub struct LiveChannel {
    shared: Arc<Shared>,
}

struct Shared {
    settings: ChannelSettings,
    sink: Arc<dyn EventSink>,
    runtime: Handle,
    snapshot: Mutex<ChannelSnapshot>,
    started: AtomicBool,
    wake: Notify,
    shutdown: CancellationToken,
    outbound_tx: mpsc::UnboundedSender<String>,
    outbound_rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl Shared {
    fn lock_snapshot(&self) -> MutexGuard<'_, ChannelSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: ChannelStatus) {
        self.lock_snapshot().status = status;
    }

    fn mark_connecting(&self) -> u32 {
        let mut snapshot = self.lock_snapshot();
        snapshot.status = ChannelStatus::Connecting;
        snapshot.retry_count
    }

    fn mark_connected(&self) {
        let mut snapshot = self.lock_snapshot();
        snapshot.status = ChannelStatus::Connected;
        snapshot.retry_count = 0;
    }

    fn mark_disconnected(&self) -> u32 {
        let mut snapshot = self.lock_snapshot();
        snapshot.status = ChannelStatus::Disconnected;
        snapshot.retry_count = snapshot.retry_count.saturating_add(1);
        snapshot.retry_count
    }

    fn emit(&self, event: ChannelEvent) {
        self.sink.emit(EngineEvent::Channel(event));
    }
}

impl LiveChannel {
    /// Creates a disconnected channel. Nothing happens until [`connect`](Self::connect).
    pub fn new(settings: ChannelSettings, sink: Arc<dyn EventSink>, runtime: Handle) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(Shared {
                settings,
                sink,
                runtime,
                snapshot: Mutex::new(ChannelSnapshot::default()),
                started: AtomicBool::new(false),
                wake: Notify::new(),
                shutdown: CancellationToken::new(),
                outbound_tx,
                outbound_rx: Mutex::new(Some(outbound_rx)),
            }),
        }
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        *self.shared.lock_snapshot()
    }

    /// Starts connecting. A no-op unless the channel is `Disconnected`; while
    /// waiting out a reconnect delay it cuts the wait short.
    pub fn connect(&self) {
        if self.shared.shutdown.is_cancelled() {
            return;
        }
        {
            let mut snapshot = self.shared.lock_snapshot();
            if snapshot.status != ChannelStatus::Disconnected {
                scribe_debug!("connect() ignored, channel is {:?}", snapshot.status);
                return;
            }
            snapshot.status = ChannelStatus::Connecting;
        }

        if self.shared.started.swap(true, Ordering::SeqCst) {
            self.shared.wake.notify_one();
            return;
        }
        let outbound_rx = self
            .shared
            .outbound_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(outbound_rx) = outbound_rx {
            let shared = self.shared.clone();
            self.shared.runtime.spawn(supervise(shared, outbound_rx));
        }
    }

    /// Queues a frame on the open connection. Fails fast unless `Connected`.
    pub fn send(&self, frame: &OutboundFrame) -> Result<(), ChannelError> {
        let status = self.snapshot().status;
        if status != ChannelStatus::Connected {
            scribe_warn!("Cannot send {:?}: channel is {:?}", frame, status);
            return Err(ChannelError::NotReady { status });
        }
        self.shared
            .outbound_tx
            .send(encode_frame(frame))
            .map_err(|_| ChannelError::NotReady {
                status: ChannelStatus::Disconnected,
            })
    }

    /// Closes the connection for good.
    pub fn shutdown(&self) {
        self.shared.shutdown.cancel();
    }
}

async fn supervise(shared: Arc<Shared>, mut outbound_rx: mpsc::UnboundedReceiver<String>) {
    loop {
        let retry_count = shared.mark_connecting();
        scribe_info!("Connecting live channel to {}", shared.settings.url);
        shared.emit(ChannelEvent::Connecting { retry_count });

        let reason = tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            reason = run_connection(&shared, &mut outbound_rx) => reason,
        };

        let retry_count = shared.mark_disconnected();
        let mut dropped = 0usize;
        while outbound_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            scribe_warn!("Dropped {} outbound frame(s) queued on a closed connection", dropped);
        }
        shared.emit(ChannelEvent::Disconnected {
            reason: reason.clone(),
            retry_count,
        });

        let delay = shared.settings.reconnect.delay(retry_count);
        scribe_warn!(
            "Live channel down ({}); retry {} in {:?}",
            reason,
            retry_count,
            delay
        );
        tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
            _ = shared.wake.notified() => scribe_debug!("Reconnect requested before delay elapsed"),
        }
    }

    shared.set_status(ChannelStatus::Disconnected);
    scribe_info!("Live channel shut down");
}

/// Runs one connection to completion and returns why it ended.
async fn run_connection(
    shared: &Shared,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
) -> String {
    let settings = &shared.settings;
    let connecting = tokio::time::timeout(settings.connect_timeout, connect_async(settings.url.as_str()));
    let ws_stream = match connecting.await {
        Ok(Ok((ws_stream, _response))) => ws_stream,
        Ok(Err(err)) => return format!("connect failed: {err}"),
        Err(_) => return format!("connect timed out after {:?}", settings.connect_timeout),
    };

    shared.mark_connected();
    scribe_info!("Live channel connected");
    shared.emit(ChannelEvent::Connected);

    let (mut writer, mut reader) = ws_stream.split();
    let mut heartbeat = tokio::time::interval(settings.heartbeat_interval.max(MIN_HEARTBEAT));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            incoming = reader.next() => match incoming {
                Some(Ok(Message::Text(text))) => deliver(shared, text.as_str()),
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => deliver(shared, text),
                    Err(_) => shared.emit(ChannelEvent::ProtocolError {
                        detail: "binary frame is not UTF-8".to_string(),
                    }),
                },
                Some(Ok(Message::Close(frame))) => {
                    return format!("closed by server: {frame:?}");
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return format!("read failed: {err}"),
                None => return "connection closed".to_string(),
            },
            outgoing = outbound_rx.recv() => match outgoing {
                Some(text) => {
                    scribe_debug!("Sending frame {}", text);
                    if let Err(err) = writer.send(Message::Text(text.into())).await {
                        return format!("send failed: {err}");
                    }
                }
                None => return "outbound queue closed".to_string(),
            },
            _ = heartbeat.tick() => {
                if let Err(err) = writer.send(Message::Ping(Vec::new().into())).await {
                    return format!("heartbeat failed: {err}");
                }
            }
        }
    }
}

fn deliver(shared: &Shared, text: &str) {
    let event = match decode_frame(text) {
        Ok(event) => event,
        Err(err) => {
            scribe_warn!("Ignoring malformed frame ({}): {}", err, text);
            ChannelEvent::ProtocolError {
                detail: err.to_string(),
            }
        }
    };
    shared.emit(event);
}
