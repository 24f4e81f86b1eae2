//! Property-based tests for the conversation controller
//!
//! Random sequences of submissions and clears against a mock transport.
//! After every step:
//! - a blank submission changes nothing
//! - an accepted submission shows the user turn and `pending` before the reply
//! - `pending` is false once the submission completes
//! - a text reply adds two turns, an empty reply or a failure adds one
//! - `last_error` is set exactly when the submission failed
//! - clearing always leaves no turns and no error

use super::testing::MockTransport;
use super::{ChatError, ConversationController, RequestSettings, Turn};
use crate::llm::MessageRole;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Answer {
    Text(String),
    Empty,
    Failure { status: u16, message: String },
}

#[derive(Debug, Clone)]
enum Op {
    Submit { text: String, answer: Answer },
    Clear,
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        1 => "[ \t]{1,3}",
        6 => "[a-zA-Z0-9 .?!]{1,40}",
    ]
}

fn arb_answer() -> impl Strategy<Value = Answer> {
    prop_oneof![
        3 => "[a-zA-Z0-9 .]{1,40}".prop_map(Answer::Text),
        1 => Just(Answer::Empty),
        2 => (prop_oneof![Just(400u16), Just(429u16), Just(500u16), Just(529u16)], "[a-z ]{1,20}")
            .prop_map(|(status, message)| Answer::Failure { status, message }),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (arb_text(), arb_answer()).prop_map(|(text, answer)| Op::Submit { text, answer }),
        1 => Just(Op::Clear),
    ]
}

fn queue(mock: &MockTransport, answer: &Answer) {
    match answer {
        Answer::Text(text) => mock.queue_text(text),
        Answer::Empty => mock.queue_reply(crate::api::wire::ChatReply::default()),
        Answer::Failure { status, message } => mock.queue_error(ChatError::Server {
            status: *status,
            message: message.clone(),
        }),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_state_follows_outcomes(ops in proptest::collection::vec(arb_op(), 1..25)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let mock = Arc::new(MockTransport::new());
            let controller = ConversationController::new(mock.clone(), RequestSettings::default());
            let mut sent = 0;

            for op in ops {
                match op {
                    Op::Clear => {
                        controller.clear_conversation();
                        let state = controller.snapshot();
                        prop_assert!(state.turns.is_empty());
                        prop_assert!(state.last_error.is_none());
                    }
                    Op::Submit { text, answer } => {
                        let before = controller.snapshot();
                        let Some(submission) = controller.submit_turn(&text) else {
                            prop_assert!(text.trim().is_empty());
                            prop_assert_eq!(controller.snapshot(), before);
                            continue;
                        };
                        sent += 1;

                        let in_flight = controller.snapshot();
                        prop_assert!(in_flight.pending);
                        prop_assert!(in_flight.last_error.is_none());
                        prop_assert_eq!(in_flight.turns.len(), before.turns.len() + 1);
                        let user_turn = Turn::user(text.trim());
                        prop_assert_eq!(in_flight.last_turn(), Some(&user_turn));

                        queue(&mock, &answer);
                        submission.wait().await;

                        let after = controller.snapshot();
                        prop_assert!(!after.pending);
                        match answer {
                            Answer::Text(reply) => {
                                prop_assert_eq!(after.turns.len(), before.turns.len() + 2);
                                let reply_turn = Turn::assistant(reply);
                                prop_assert_eq!(after.last_turn(), Some(&reply_turn));
                                prop_assert!(after.last_error.is_none());
                            }
                            Answer::Empty => {
                                prop_assert_eq!(after.turns.len(), before.turns.len() + 1);
                                prop_assert!(after.last_error.is_none());
                            }
                            Answer::Failure { message, .. } => {
                                prop_assert_eq!(after.turns.len(), before.turns.len() + 1);
                                prop_assert_eq!(after.last_error, Some(message));
                            }
                        }
                    }
                }
            }

            let requests = mock.recorded_requests();
            prop_assert_eq!(requests.len(), sent);
            for request in &requests {
                prop_assert_eq!(
                    request.messages.last().map(|m| m.role),
                    Some(MessageRole::User)
                );
            }
            Ok(())
        })?;
    }
}
