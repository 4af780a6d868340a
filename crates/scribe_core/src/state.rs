use std::collections::VecDeque;

use crate::{
    CancelMode, ChannelStatus, Effect, FileBlob, IntentError, Job, JobView, LanguageTable, Phase,
    SubmissionFailure, SubmissionId, SubmissionReply, TaskId,
};

/// How many discarded task ids are remembered for stale-frame rejection.
const RETIRED_ID_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientSettings {
    pub cancel_mode: CancelMode,
    pub languages: LanguageTable,
}

/// Authoritative client-side model of the current job.
///
/// Every write to the job goes through the methods below, which makes this
/// the single serialization point between the upload reply and the live
/// channel. Races are settled by three rules:
///
/// * progress for a task id other than the current one is ignored, and the
///   ids of reset jobs are never adopted again;
/// * progress only moves forward;
/// * the first terminal outcome wins and later ones are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientState {
    settings: ClientSettings,
    job: Job,
    channel: ChannelStatus,
    retry_count: u32,
    next_submission: SubmissionId,
    /// Upload whose reply may still drive the current job.
    submission: Option<SubmissionId>,
    /// Cancel was requested before the task id was known.
    cancel_deferred: bool,
    /// Most recent ids of discarded jobs, oldest first.
    retired: VecDeque<TaskId>,
    notice: Option<String>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ClientSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn phase(&self) -> Phase {
        self.job.phase()
    }

    pub fn channel(&self) -> ChannelStatus {
        self.channel
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn view(&self) -> JobView {
        JobView::build(&self.job, self.channel, self.notice.as_deref())
    }

    /// Starts a new job. A finished job is discarded first.
    pub fn submit(&mut self, file: FileBlob, language: &str) -> Result<Vec<Effect>, IntentError> {
        if self.job.phase().is_active() {
            return Err(IntentError::JobInProgress);
        }
        let language_tag = self
            .settings
            .languages
            .resolve(language)
            .ok_or_else(|| IntentError::UnsupportedLanguage {
                code: language.to_string(),
            })?
            .to_string();
        if file.bytes.is_empty() {
            return Err(IntentError::EmptyFile);
        }

        self.reset();
        self.next_submission += 1;
        let submission_id = self.next_submission;
        self.submission = Some(submission_id);
        self.job = Job::submitting();

        Ok(vec![
            self.changed(),
            Effect::Submit {
                submission_id,
                file,
                language_tag,
            },
        ])
    }

    /// Cancellation coordinator: one user intent, at most one wire action.
    pub fn cancel(&mut self) -> Result<Vec<Effect>, IntentError> {
        match self.job.phase() {
            Phase::Cancelling => Ok(Vec::new()),
            Phase::Submitting | Phase::Processing => {
                self.job.set_phase(Phase::Cancelling);
                self.notice = None;
                let mut effects = vec![self.changed()];
                match self.job.id().cloned() {
                    Some(task_id) => effects.push(self.cancel_action(task_id)),
                    // The wire action waits for the first progress frame.
                    None => self.cancel_deferred = true,
                }
                Ok(effects)
            }
            _ => Err(IntentError::NoActiveJob),
        }
    }

    /// Drops the current job, whatever its phase.
    pub fn repeat(&mut self) -> Vec<Effect> {
        if self.job.phase() == Phase::Idle {
            return Vec::new();
        }
        self.reset();
        vec![self.changed()]
    }

    pub fn request_download(&self) -> Result<Vec<Effect>, IntentError> {
        self.job
            .result_locator()
            .map(|locator| {
                vec![Effect::OpenDownload {
                    locator: locator.to_string(),
                }]
            })
            .ok_or(IntentError::NoDownloadAvailable)
    }

    pub fn apply_submission(
        &mut self,
        submission_id: SubmissionId,
        result: Result<SubmissionReply, SubmissionFailure>,
    ) -> Vec<Effect> {
        if self.submission != Some(submission_id) || !self.job.phase().is_active() {
            return Vec::new();
        }
        match result {
            Ok(SubmissionReply::Transcribed {
                task_id,
                text,
                locator,
            }) => {
                self.adopt_reply_id(task_id);
                self.job.complete(text, locator);
            }
            Ok(SubmissionReply::Cancelled { task_id, message }) => {
                self.adopt_reply_id(task_id);
                self.job.cancel(message);
            }
            Err(failure) => self.job.fail(failure.detail),
        }
        self.finish();
        vec![self.changed()]
    }

    pub fn apply_progress(&mut self, task_id: TaskId, progress: u8) -> Vec<Effect> {
        if self.is_retired(&task_id) {
            return Vec::new();
        }
        match self.job.phase() {
            Phase::Submitting => {
                // The channel raced ahead of the upload reply.
                self.job.assign_id(task_id);
                self.job.set_phase(Phase::Processing);
                self.job.raise_progress(progress);
                vec![self.changed()]
            }
            Phase::Processing if self.job.id() == Some(&task_id) => {
                if self.job.raise_progress(progress) {
                    vec![self.changed()]
                } else {
                    Vec::new()
                }
            }
            Phase::Cancelling if self.cancel_deferred && self.job.id().is_none() => {
                self.job.assign_id(task_id.clone());
                self.job.raise_progress(progress);
                self.cancel_deferred = false;
                vec![self.changed(), self.cancel_action(task_id)]
            }
            _ => Vec::new(),
        }
    }

    /// An ack naming another task belongs to an earlier job and is dropped.
    pub fn apply_cancel_ack(&mut self, task_id: Option<TaskId>, message: String) -> Vec<Effect> {
        let dispatched = self.job.id().is_some() && !self.cancel_deferred;
        if self.job.phase() != Phase::Cancelling || !dispatched {
            return Vec::new();
        }
        if task_id.is_some_and(|id| self.job.id() != Some(&id)) {
            return Vec::new();
        }
        self.job.cancel(message);
        self.finish();
        vec![self.changed()]
    }

    /// Errors without a task id fail whatever job is active.
    pub fn apply_server_error(&mut self, task_id: Option<TaskId>, detail: String) -> Vec<Effect> {
        if !self.job.phase().is_active() {
            return Vec::new();
        }
        if let Some(task_id) = &task_id {
            let foreign = match self.job.id() {
                Some(current) => current != task_id,
                None => self.is_retired(task_id),
            };
            if foreign {
                return Vec::new();
            }
        }
        self.job.fail(detail);
        self.finish();
        vec![self.changed()]
    }

    pub fn apply_cancel_resolved(
        &mut self,
        task_id: TaskId,
        result: Result<String, String>,
    ) -> Vec<Effect> {
        if self.job.phase() != Phase::Cancelling || self.job.id() != Some(&task_id) {
            return Vec::new();
        }
        match result {
            Ok(message) => {
                self.job.cancel(message);
                self.finish();
            }
            Err(reason) => {
                // The job is still running server-side; let the user retry.
                self.job.set_phase(Phase::Processing);
                self.notice = Some(format!("Error cancelling transcription: {reason}"));
            }
        }
        vec![self.changed()]
    }

    pub fn apply_channel_status(&mut self, status: ChannelStatus, retry_count: u32) {
        self.channel = status;
        self.retry_count = retry_count;
    }

    fn cancel_action(&self, task_id: TaskId) -> Effect {
        match self.settings.cancel_mode {
            CancelMode::OutOfBand => Effect::CancelOutOfBand { task_id },
            CancelMode::OverChannel => Effect::CancelOverChannel { task_id },
        }
    }

    fn adopt_reply_id(&mut self, task_id: Option<TaskId>) {
        if let Some(task_id) = task_id {
            if !self.is_retired(&task_id) {
                self.job.assign_id(task_id);
            }
        }
    }

    fn is_retired(&self, task_id: &TaskId) -> bool {
        self.retired.contains(task_id)
    }

    fn retire(&mut self, task_id: TaskId) {
        if self.is_retired(&task_id) {
            return;
        }
        if self.retired.len() == RETIRED_ID_CAPACITY {
            self.retired.pop_front();
        }
        self.retired.push_back(task_id);
    }

    fn finish(&mut self) {
        self.submission = None;
        self.cancel_deferred = false;
    }

    fn reset(&mut self) {
        if let Some(id) = self.job.id().cloned() {
            self.retire(id);
        }
        self.job = Job::default();
        self.submission = None;
        self.cancel_deferred = false;
        self.notice = None;
    }

    fn changed(&self) -> Effect {
        Effect::StateChanged(self.view())
    }
}
