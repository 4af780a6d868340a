use pretty_assertions::assert_eq;
use scribe_core::{
    update, ClientState, Effect, FileBlob, IntentError, Msg, Phase, SubmissionFailure,
    SubmissionId, SubmissionReply, TaskId,
};

fn init_logging() {
    scribe_logging::initialize_for_tests();
}

fn wav(name: &str) -> FileBlob {
    FileBlob {
        name: name.to_string(),
        bytes: vec![0x52, 0x49, 0x46, 0x46],
    }
}

fn submit(state: ClientState, language: &str) -> (ClientState, Vec<Effect>) {
    update(
        state,
        Msg::SubmitClicked {
            file: wav("a.wav"),
            language: language.to_string(),
        },
    )
}

fn submission_id(effects: &[Effect]) -> SubmissionId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Submit { submission_id, .. } => Some(*submission_id),
            _ => None,
        })
        .expect("submit effect")
}

fn transcribed(task_id: &str, text: &str, locator: &str) -> Result<SubmissionReply, SubmissionFailure> {
    Ok(SubmissionReply::Transcribed {
        task_id: Some(TaskId::from(task_id)),
        text: text.to_string(),
        locator: locator.to_string(),
    })
}

#[test]
fn submit_moves_to_submitting_and_requests_upload() {
    init_logging();
    let (state, effects) = submit(ClientState::new(), "en");

    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(effects.len(), 2);
    match &effects[0] {
        Effect::StateChanged(view) => {
            assert_eq!(view.job.phase(), Phase::Submitting);
            assert_eq!(view.summary, "Uploading, please wait...");
            assert!(view.can_cancel);
        }
        other => panic!("expected StateChanged, got {other:?}"),
    }
    assert_eq!(
        effects[1],
        Effect::Submit {
            submission_id: 1,
            file: wav("a.wav"),
            language_tag: "en-US".to_string(),
        }
    );
}

#[test]
fn submission_success_completes_job() {
    init_logging();
    let (state, effects) = submit(ClientState::new(), "en");
    let submission_id = submission_id(&effects);

    let (state, effects) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: transcribed("t1", "hello world", "/files/1"),
        },
    );

    let job = state.job();
    assert_eq!(job.phase(), Phase::Completed);
    assert_eq!(job.result_text(), Some("hello world"));
    assert_eq!(job.result_locator(), Some("/files/1"));
    assert_eq!(job.id(), Some(&TaskId::from("t1")));
    assert_eq!(job.progress(), 100);
    assert_eq!(job.error_detail(), None);
    assert_eq!(effects.len(), 1);
}

#[test]
fn submission_failure_fails_job_with_detail() {
    init_logging();
    let (state, effects) = submit(ClientState::new(), "pt");
    let submission_id = submission_id(&effects);

    let (state, _) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: Err(SubmissionFailure {
                status: Some(500),
                detail: "http status 500".to_string(),
            }),
        },
    );

    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.job().error_detail(), Some("http status 500"));
    assert_eq!(state.view().summary, "An error occurred: http status 500");
    assert_eq!(state.job().result_text(), None);
}

#[test]
fn unsupported_language_is_rejected_without_upload() {
    init_logging();
    let state = ClientState::new();
    let (next, effects) = submit(state.clone(), "xx");

    assert_eq!(next, state);
    assert_eq!(
        effects,
        vec![Effect::Rejected(IntentError::UnsupportedLanguage {
            code: "xx".to_string()
        })]
    );
}

#[test]
fn empty_file_is_rejected() {
    init_logging();
    let (state, effects) = update(
        ClientState::new(),
        Msg::SubmitClicked {
            file: FileBlob {
                name: "empty.wav".to_string(),
                bytes: Vec::new(),
            },
            language: "en".to_string(),
        },
    );

    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(effects, vec![Effect::Rejected(IntentError::EmptyFile)]);
}

#[test]
fn second_submit_while_active_is_rejected() {
    init_logging();
    let (state, _) = submit(ClientState::new(), "en");
    let (state, effects) = submit(state, "en");

    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(effects, vec![Effect::Rejected(IntentError::JobInProgress)]);
}

#[test]
fn submit_after_completion_starts_fresh_job() {
    init_logging();
    let (state, effects) = submit(ClientState::new(), "en");
    let first = submission_id(&effects);
    let (state, _) = update(
        state,
        Msg::SubmissionResolved {
            submission_id: first,
            result: transcribed("t1", "one", "/files/1"),
        },
    );

    let (state, effects) = submit(state, "sp");
    let second = submission_id(&effects);
    assert_ne!(first, second);
    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(state.job().id(), None);
    assert_eq!(state.job().result_text(), None);
}

#[test]
fn repeat_resets_to_idle_and_ignores_late_reply() {
    init_logging();
    let (state, effects) = submit(ClientState::new(), "en");
    let submission_id = submission_id(&effects);

    let (state, effects) = update(state, Msg::RepeatClicked);
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(effects.len(), 1);

    let (state, effects) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: transcribed("t1", "late", "/files/1"),
        },
    );
    assert_eq!(state.phase(), Phase::Idle);
    assert!(effects.is_empty());
}

#[test]
fn repeat_while_idle_does_nothing() {
    let state = ClientState::new();
    let (next, effects) = update(state.clone(), Msg::RepeatClicked);
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn download_exposes_locator_only_when_completed() {
    init_logging();
    let (state, effects) = update(ClientState::new(), Msg::DownloadClicked);
    assert_eq!(effects, vec![Effect::Rejected(IntentError::NoDownloadAvailable)]);

    let (state, effects) = submit(state, "en");
    let submission_id = submission_id(&effects);
    let (state, _) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: transcribed("t1", "hello world", "/download/t1"),
        },
    );
    assert!(state.view().can_download);

    let (state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(
        effects,
        vec![Effect::OpenDownload {
            locator: "/download/t1".to_string()
        }]
    );
    assert_eq!(state.phase(), Phase::Completed);
}

#[test]
fn server_cancelled_reply_ends_job_cancelled() {
    init_logging();
    let (state, effects) = submit(ClientState::new(), "en");
    let submission_id = submission_id(&effects);

    let (state, _) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: Ok(SubmissionReply::Cancelled {
                task_id: Some(TaskId::from("t9")),
                message: "Transcription cancelled".to_string(),
            }),
        },
    );

    assert_eq!(state.phase(), Phase::Cancelled);
    assert_eq!(state.job().cancel_message(), Some("Transcription cancelled"));
    assert_eq!(state.view().summary, "Transcription cancelled.");
}
