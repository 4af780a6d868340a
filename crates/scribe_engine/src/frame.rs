//! JSON frame codec for the live channel.
//!
//! Inbound frames are decoded once, here, into the closed [`ChannelEvent`]
//! taxonomy. Anything that does not fit is a [`FrameError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ChannelEvent, OutboundFrame};

/// Substring the server puts in every cancellation acknowledgment.
pub const CANCEL_ACK_MARKER: &str = "Cancellation requested";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Syntax(String),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("progress frame is missing {0}")]
    MissingField(&'static str),
    #[error("field {field} has an invalid value")]
    InvalidField { field: &'static str },
    #[error("unrecognised frame")]
    Unrecognised,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "taskId", alias = "task_id")]
    task_id: Option<Value>,
    progress: Option<Value>,
    message: Option<Value>,
    error: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelTaskFrame<'a> {
    cancel_task: bool,
    task_id: &'a str,
}

pub fn decode_frame(text: &str) -> Result<ChannelEvent, FrameError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| FrameError::Syntax(err.to_string()))?;
    if !value.is_object() {
        return Err(FrameError::NotAnObject);
    }
    let raw: RawFrame =
        serde_json::from_value(value).map_err(|err| FrameError::Syntax(err.to_string()))?;

    if let Some(progress) = raw.progress {
        let task_id = raw.task_id.ok_or(FrameError::MissingField("taskId"))?;
        return Ok(ChannelEvent::Progress {
            task_id: task_id_text(&task_id)?,
            progress: percent(&progress)?,
        });
    }
    let task_id = raw.task_id.as_ref().map(task_id_text).transpose()?;

    if let Some(error) = raw.error {
        let detail = match error {
            Value::String(text) => text,
            other => other.to_string(),
        };
        return Ok(ChannelEvent::Error { task_id, detail });
    }

    if let Some(message) = raw.message {
        let message = message
            .as_str()
            .ok_or(FrameError::InvalidField { field: "message" })?;
        if message.contains(CANCEL_ACK_MARKER) {
            return Ok(ChannelEvent::CancelAck {
                task_id: task_id.or_else(|| acked_task_id(message)),
                message: message.to_string(),
            });
        }
    }

    Err(FrameError::Unrecognised)
}

pub fn encode_frame(frame: &OutboundFrame) -> String {
    match frame {
        OutboundFrame::CancelTask { task_id } => serde_json::to_string(&CancelTaskFrame {
            cancel_task: true,
            task_id,
        })
        // Serializing a bool and a str cannot fail.
        .unwrap_or_default(),
    }
}

/// Task id named in ack text such as `Cancellation requested for task t2`.
fn acked_task_id(message: &str) -> Option<String> {
    let (_, rest) = message.split_once(CANCEL_ACK_MARKER)?;
    let rest = rest.trim_start().strip_prefix("for")?.trim_start();
    let rest = rest
        .strip_prefix("task ID:")
        .or_else(|| rest.strip_prefix("task "))
        .unwrap_or(rest);
    let id = rest
        .split_whitespace()
        .next()?
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | '!'));
    (!id.is_empty()).then(|| id.to_string())
}

fn task_id_text(value: &Value) -> Result<String, FrameError> {
    match value {
        Value::String(text) if !text.is_empty() => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(FrameError::InvalidField { field: "taskId" }),
    }
}

fn percent(value: &Value) -> Result<u8, FrameError> {
    let number = value
        .as_f64()
        .ok_or(FrameError::InvalidField { field: "progress" })?;
    Ok(number.clamp(0.0, 100.0).floor() as u8)
}
