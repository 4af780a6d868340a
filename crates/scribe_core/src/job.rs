use std::fmt;

/// Server-assigned identifier of a transcription task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Local correlation number for one upload request.
pub type SubmissionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Processing,
    Completed,
    Cancelling,
    Cancelled,
    Failed,
}

impl Phase {
    /// A job is active while the server may still be working on it.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Processing | Phase::Cancelling)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Cancelled | Phase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Transcribed { text: String, locator: String },
    Cancelled { message: String },
    Failed { detail: String },
}

/// The single job tracked by a client session.
///
/// Result and error fields are only reachable through accessors gated by
/// [`Phase`], so a completed job never reports an error and a failed job
/// never reports a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Job {
    id: Option<TaskId>,
    phase: Phase,
    progress: u8,
    outcome: Option<Outcome>,
}

impl Job {
    pub fn id(&self) -> Option<&TaskId> {
        self.id.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn result_text(&self) -> Option<&str> {
        match (&self.phase, &self.outcome) {
            (Phase::Completed, Some(Outcome::Transcribed { text, .. })) => Some(text),
            _ => None,
        }
    }

    pub fn result_locator(&self) -> Option<&str> {
        match (&self.phase, &self.outcome) {
            (Phase::Completed, Some(Outcome::Transcribed { locator, .. })) => Some(locator),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match (&self.phase, &self.outcome) {
            (Phase::Failed, Some(Outcome::Failed { detail })) => Some(detail),
            _ => None,
        }
    }

    /// Server message attached to a cancelled job, if any.
    pub fn cancel_message(&self) -> Option<&str> {
        match (&self.phase, &self.outcome) {
            (Phase::Cancelled, Some(Outcome::Cancelled { message })) => Some(message),
            _ => None,
        }
    }

    pub(crate) fn submitting() -> Self {
        Self {
            phase: Phase::Submitting,
            ..Self::default()
        }
    }

    /// Assigns the server id. Returns false if an id is already set.
    pub(crate) fn assign_id(&mut self, id: TaskId) -> bool {
        if self.id.is_some() {
            return false;
        }
        self.id = Some(id);
        true
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Raises progress to `value` (clamped to 100). Returns true if it moved.
    pub(crate) fn raise_progress(&mut self, value: u8) -> bool {
        let value = value.min(100);
        if value > self.progress {
            self.progress = value;
            true
        } else {
            false
        }
    }

    pub(crate) fn complete(&mut self, text: String, locator: String) {
        self.phase = Phase::Completed;
        self.progress = 100;
        self.outcome = Some(Outcome::Transcribed { text, locator });
    }

    pub(crate) fn cancel(&mut self, message: String) {
        self.phase = Phase::Cancelled;
        self.outcome = Some(Outcome::Cancelled { message });
    }

    pub(crate) fn fail(&mut self, detail: String) {
        self.phase = Phase::Failed;
        self.outcome = Some(Outcome::Failed { detail });
    }
}
