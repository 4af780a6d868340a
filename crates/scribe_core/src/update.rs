use crate::{ClientState, Effect, IntentError, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ClientState, msg: Msg) -> (ClientState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitClicked { file, language } => or_rejected(state.submit(file, &language)),
        Msg::CancelClicked => or_rejected(state.cancel()),
        Msg::RepeatClicked => state.repeat(),
        Msg::DownloadClicked => or_rejected(state.request_download()),
        Msg::SubmissionResolved {
            submission_id,
            result,
        } => state.apply_submission(submission_id, result),
        Msg::ProgressReceived { task_id, progress } => state.apply_progress(task_id, progress),
        Msg::CancelAcknowledged { task_id, message } => state.apply_cancel_ack(task_id, message),
        Msg::ServerErrorReceived { task_id, detail } => state.apply_server_error(task_id, detail),
        Msg::CancelResolved { task_id, result } => state.apply_cancel_resolved(task_id, result),
        Msg::ChannelStatusChanged {
            status,
            retry_count,
        } => {
            state.apply_channel_status(status, retry_count);
            Vec::new()
        }
        // Malformed frames never touch the job.
        Msg::ProtocolErrorReceived { .. } => Vec::new(),
    };

    (state, effects)
}

fn or_rejected(result: Result<Vec<Effect>, IntentError>) -> Vec<Effect> {
    result.unwrap_or_else(|err| vec![Effect::Rejected(err)])
}
