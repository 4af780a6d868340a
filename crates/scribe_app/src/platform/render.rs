use std::io::Write;

use scribe_core::{ChannelStatus, IntentError, JobView, Phase, Presenter};
use scribe_logging::scribe_warn;

const BAR_WIDTH: usize = 30;

/// Draws job views as plain text lines. Only changes are printed: a view
/// whose summary, notice and channel match the previous one is skipped.
pub struct TerminalPresenter<W: Write> {
    out: W,
    last: Option<JobView>,
    echo_result: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            echo_result: true,
        }
    }

    /// Leaves the transcript out of the rendered output.
    pub fn without_result_echo(mut self) -> Self {
        self.echo_result = false;
        self
    }

    pub fn reject(&mut self, err: &IntentError) {
        self.write_line(&format!("! {err}"));
    }

    pub fn line(&mut self, text: &str) {
        self.write_line(text);
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            scribe_warn!("Failed to write to terminal: {}", err);
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, view: &JobView) {
        let previous = self.last.replace(view.clone());
        let previous = previous.as_ref();

        if previous.map(|p| p.channel) != Some(view.channel) {
            self.write_line(&format!("[channel {}]", channel_label(view.channel)));
        }

        let job_changed = previous.map_or(true, |p| p.summary != view.summary);
        if job_changed && !view.summary.is_empty() {
            let line = match view.job.phase() {
                Phase::Processing => format!(
                    "{} {}",
                    progress_bar(view.job.progress(), BAR_WIDTH),
                    view.summary
                ),
                _ => view.summary.clone(),
            };
            self.write_line(&line);
            if self.echo_result && view.job.phase() == Phase::Completed {
                if let Some(text) = view.job.result_text() {
                    self.write_line(text);
                }
                if let Some(locator) = view.job.result_locator() {
                    self.write_line(&format!("Download: {locator}"));
                }
            }
        }

        if let Some(notice) = &view.notice {
            if previous.and_then(|p| p.notice.as_ref()) != Some(notice) {
                self.write_line(&format!("! {notice}"));
            }
        }
    }
}

fn channel_label(status: ChannelStatus) -> &'static str {
    match status {
        ChannelStatus::Disconnected => "disconnected",
        ChannelStatus::Connecting => "connecting",
        ChannelStatus::Connected => "connected",
    }
}

/// `[#####-----]` style bar for a 0..=100 percentage.
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * width / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
