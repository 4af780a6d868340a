use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use anyhow::{anyhow, bail, Context};
use scribe_core::{update, ClientState, Effect, IntentError, Msg, Phase, Presenter};
use scribe_engine::EngineHandle;
use scribe_logging::{scribe_info, scribe_warn};

use super::config::AppConfig;
use super::effects::{resolve_locator, EffectRunner, MsgSink};
use super::input::{self, HELP};
use super::render::TerminalPresenter;

/// Everything the main loop reacts to, from any thread.
pub enum AppEvent {
    Core(Msg),
    Help,
    InputError(String),
    Quit,
}

pub enum Mode {
    /// Read commands from stdin until `quit` or EOF.
    Interactive,
    /// Transcribe one file and exit.
    OneShot {
        file: PathBuf,
        language: String,
        output: Option<PathBuf>,
    },
}

pub fn run_app(config: &AppConfig, mode: Mode) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let engine_config = config.engine_config();
    let engine = EngineHandle::new(
        engine_config.clone(),
        Arc::new(MsgSink::new(event_tx.clone())),
    )
    .context("starting engine")?;
    let runner = EffectRunner::new(engine, &engine_config, config.open_downloads, event_tx.clone());
    runner.connect();

    let state = ClientState::with_settings(config.client_settings());
    scribe_info!("scribe started against {}", config.server_url);

    match mode {
        Mode::Interactive => {
            let mut app = App::new(state, runner, TerminalPresenter::new(io::stdout()));
            input::spawn_stdin_reader(event_tx);
            app.presenter.line(HELP);
            app.run_interactive(&event_rx);
            Ok(())
        }
        Mode::OneShot {
            file,
            language,
            output,
        } => {
            let presenter = TerminalPresenter::new(io::stderr()).without_result_echo();
            let mut app = App::new(state, runner, presenter);
            let blob = input::read_file(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let result = app.run_one_shot(&event_rx, Msg::SubmitClicked { file: blob, language })?;
            write_result(&result, output.as_deref())?;
            let url = resolve_locator(&config.server_url, &result.locator);
            app.presenter.line(&format!("Download: {url}"));
            Ok(())
        }
    }
}

/// Transcript and download locator of a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub locator: String,
}

struct App<W: Write> {
    state: ClientState,
    runner: EffectRunner,
    presenter: TerminalPresenter<W>,
    rejected: Option<IntentError>,
}

impl<W: Write> App<W> {
    fn new(state: ClientState, runner: EffectRunner, presenter: TerminalPresenter<W>) -> Self {
        Self {
            state,
            runner,
            presenter,
            rejected: None,
        }
    }

    fn handle(&mut self, msg: Msg) {
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        for effect in effects {
            match effect {
                Effect::StateChanged(view) => self.presenter.render(&view),
                Effect::Rejected(err) => {
                    self.presenter.reject(&err);
                    self.rejected = Some(err);
                }
                other => {
                    if let Some(url) = self.runner.run(other) {
                        self.presenter.line(&format!("Download: {url}"));
                    }
                }
            }
        }
    }

    fn run_interactive(&mut self, events: &mpsc::Receiver<AppEvent>) {
        while let Ok(event) = events.recv() {
            match event {
                AppEvent::Core(msg) => self.handle(msg),
                AppEvent::Help => self.presenter.line(HELP),
                AppEvent::InputError(err) => self.presenter.line(&format!("! {err}")),
                AppEvent::Quit => break,
            }
        }
        if self.state.phase().is_active() {
            scribe_warn!("Exiting with a job still {:?}", self.state.phase());
        }
    }

    fn run_one_shot(
        &mut self,
        events: &mpsc::Receiver<AppEvent>,
        submit: Msg,
    ) -> anyhow::Result<Transcript> {
        self.handle(submit);
        if let Some(err) = self.rejected.take() {
            return Err(err.into());
        }

        while !self.state.phase().is_terminal() {
            match events.recv() {
                Ok(AppEvent::Core(msg)) => self.handle(msg),
                Ok(AppEvent::Quit) => bail!("interrupted"),
                Ok(_) => {}
                Err(_) => bail!("engine stopped before the job finished"),
            }
        }

        let job = self.state.job();
        match job.phase() {
            Phase::Completed => Ok(Transcript {
                text: job.result_text().unwrap_or_default().to_string(),
                locator: job.result_locator().unwrap_or_default().to_string(),
            }),
            Phase::Cancelled => Err(anyhow!(
                "{}",
                job.cancel_message().unwrap_or("Transcription cancelled")
            )),
            _ => Err(anyhow!(
                "transcription failed: {}",
                job.error_detail().unwrap_or("unknown error")
            )),
        }
    }
}

fn write_result(result: &Transcript, output: Option<&std::path::Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, &result.text)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", result.text).context("writing transcript")
        }
    }
}
