use scribe_core::{
    update, ChannelStatus, ClientState, Effect, FileBlob, Msg, Phase, SubmissionFailure,
    SubmissionReply, TaskId,
};

fn submit(state: ClientState) -> (ClientState, u64) {
    let (state, effects) = update(
        state,
        Msg::SubmitClicked {
            file: FileBlob {
                name: "a.wav".to_string(),
                bytes: vec![1, 2, 3],
            },
            language: "en".to_string(),
        },
    );
    let submission_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Submit { submission_id, .. } => Some(*submission_id),
            _ => None,
        })
        .unwrap();
    (state, submission_id)
}

fn progress(state: ClientState, task_id: &str, value: u8) -> (ClientState, Vec<Effect>) {
    update(
        state,
        Msg::ProgressReceived {
            task_id: TaskId::from(task_id),
            progress: value,
        },
    )
}

#[test]
fn first_progress_frame_moves_submitting_to_processing() {
    let (state, _) = submit(ClientState::new());
    let (state, effects) = progress(state, "t1", 15);

    assert_eq!(state.phase(), Phase::Processing);
    assert_eq!(state.job().id(), Some(&TaskId::from("t1")));
    assert_eq!(state.job().progress(), 15);
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().summary, "Processing Percentage: 15%");
}

#[test]
fn progress_is_monotonic_under_reordering() {
    let (state, _) = submit(ClientState::new());
    let (state, _) = progress(state, "t1", 40);
    let (state, effects) = progress(state, "t1", 25);

    assert_eq!(state.job().progress(), 40);
    assert!(effects.is_empty());

    let (state, effects) = progress(state, "t1", 60);
    assert_eq!(state.job().progress(), 60);
    assert_eq!(effects.len(), 1);
}

#[test]
fn progress_for_other_task_is_ignored() {
    let (state, _) = submit(ClientState::new());
    let (state, _) = progress(state, "t1", 10);
    let before = state.clone();

    let (state, effects) = progress(state, "other", 90);
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn progress_while_idle_is_ignored() {
    let state = ClientState::new();
    let (next, effects) = progress(state.clone(), "t1", 50);
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn progress_from_reset_job_is_not_adopted_by_next_job() {
    let (state, _) = submit(ClientState::new());
    let (state, _) = progress(state, "old", 30);
    let (state, _) = update(state, Msg::RepeatClicked);

    let (state, _) = submit(state);
    let (state, effects) = progress(state, "old", 35);
    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(state.job().id(), None);
    assert!(effects.is_empty());

    let (state, _) = progress(state, "new", 5);
    assert_eq!(state.job().id(), Some(&TaskId::from("new")));
}

#[test]
fn upload_reply_completes_processing_job() {
    let (state, submission_id) = submit(ClientState::new());
    let (state, _) = progress(state, "t1", 70);

    let (state, effects) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: Ok(SubmissionReply::Transcribed {
                task_id: Some(TaskId::from("t1")),
                text: "done".to_string(),
                locator: "/download/t1".to_string(),
            }),
        },
    );
    assert_eq!(state.phase(), Phase::Completed);
    assert_eq!(effects.len(), 1);

    // Late frames for the finished job change nothing.
    let (state, effects) = progress(state, "t1", 99);
    assert_eq!(state.job().progress(), 100);
    assert!(effects.is_empty());
}

#[test]
fn upload_reply_keeps_id_learned_from_channel() {
    let (state, submission_id) = submit(ClientState::new());
    let (state, _) = progress(state, "from-channel", 10);

    let (state, _) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: Ok(SubmissionReply::Transcribed {
                task_id: Some(TaskId::from("from-reply")),
                text: "text".to_string(),
                locator: "/download/x".to_string(),
            }),
        },
    );
    assert_eq!(state.phase(), Phase::Completed);
    assert_eq!(state.job().id(), Some(&TaskId::from("from-channel")));
}

#[test]
fn server_error_fails_active_job() {
    let (state, _) = submit(ClientState::new());
    let (state, _) = progress(state, "t1", 20);

    let (state, effects) = update(
        state,
        Msg::ServerErrorReceived {
            task_id: None,
            detail: "decoder crashed".to_string(),
        },
    );
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.job().error_detail(), Some("decoder crashed"));
    assert_eq!(effects.len(), 1);
}

#[test]
fn server_error_after_completion_is_ignored() {
    let (state, submission_id) = submit(ClientState::new());
    let (state, _) = update(
        state,
        Msg::SubmissionResolved {
            submission_id,
            result: Err(SubmissionFailure {
                status: None,
                detail: "network error".to_string(),
            }),
        },
    );
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::ServerErrorReceived {
            task_id: None,
            detail: "late".to_string(),
        },
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn channel_drop_keeps_processing_job_and_resumes() {
    let (state, _) = submit(ClientState::new());
    let (state, _) = progress(state, "t1", 45);

    let (state, effects) = update(
        state,
        Msg::ChannelStatusChanged {
            status: ChannelStatus::Disconnected,
            retry_count: 1,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Processing);
    assert_eq!(state.view().channel, ChannelStatus::Disconnected);
    assert_eq!(state.retry_count(), 1);

    let (state, _) = update(
        state,
        Msg::ChannelStatusChanged {
            status: ChannelStatus::Connected,
            retry_count: 0,
        },
    );
    let (state, _) = progress(state, "t1", 50);
    assert_eq!(state.job().progress(), 50);
    assert_eq!(state.retry_count(), 0);
}

#[test]
fn missing_task_id_frame_leaves_phase_unchanged() {
    let (state, _) = submit(ClientState::new());
    let (state, effects) = update(
        state,
        Msg::ProtocolErrorReceived {
            detail: "missing taskId".to_string(),
        },
    );
    assert_eq!(state.phase(), Phase::Submitting);
    assert!(effects.is_empty());
}
