use crate::{Job, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Everything the presentation layer needs to draw the current job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobView {
    pub job: Job,
    pub summary: String,
    /// One-off remark that does not change the phase, e.g. a failed cancel.
    pub notice: Option<String>,
    pub channel: ChannelStatus,
    pub can_submit: bool,
    pub can_cancel: bool,
    pub can_repeat: bool,
    pub can_download: bool,
}

impl JobView {
    pub(crate) fn build(job: &Job, channel: ChannelStatus, notice: Option<&str>) -> Self {
        let phase = job.phase();
        Self {
            job: job.clone(),
            summary: summary(job),
            notice: notice.map(ToOwned::to_owned),
            channel,
            can_submit: !phase.is_active(),
            can_cancel: matches!(phase, Phase::Submitting | Phase::Processing),
            can_repeat: phase != Phase::Idle,
            can_download: job.result_locator().is_some(),
        }
    }
}

/// Presentation adapter driven by the core.
pub trait Presenter {
    fn render(&mut self, view: &JobView);
}

fn summary(job: &Job) -> String {
    match job.phase() {
        Phase::Idle => String::new(),
        Phase::Submitting => "Uploading, please wait...".to_string(),
        Phase::Processing => format!("Processing Percentage: {}%", job.progress()),
        Phase::Cancelling => "Cancelling transcription...".to_string(),
        Phase::Cancelled => "Transcription cancelled.".to_string(),
        Phase::Completed => {
            "Transcription complete. You can review and download your file.".to_string()
        }
        Phase::Failed => format!(
            "An error occurred: {}",
            job.error_detail().unwrap_or("unknown error")
        ),
    }
}
