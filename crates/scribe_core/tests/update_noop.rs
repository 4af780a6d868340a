use scribe_core::{update, ClientState, Msg};

#[test]
fn protocol_error_leaves_state_untouched() {
    let state = ClientState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::ProtocolErrorReceived {
            detail: "missing taskId".to_string(),
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
