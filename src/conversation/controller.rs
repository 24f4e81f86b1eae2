//! Conversation controller
//!
//! Owns one [`ConversationState`] and runs at most one submission at a time.
//! State lives in a `watch` channel: every change is published atomically,
//! so an observer never sees the user's turn without `pending` or the
//! reverse.

use super::state::{ConversationState, Turn};
use super::transport::{ChatError, ChatTransport};
use crate::api::wire::ChatRequest;
use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// Fixed per-session settings attached to every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSettings {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl RequestSettings {
    /// The whole history goes out on every call; the server keeps no session.
    pub fn build_request(&self, turns: &[Turn]) -> ChatRequest {
        ChatRequest {
            model: Some(self.model.clone()),
            max_tokens: Some(self.max_tokens),
            system: Some(self.system.clone()),
            messages: turns.iter().map(Into::into).collect(),
        }
    }
}

/// How a submission ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Assistant turn appended
    Reply(Turn),
    /// Success without usable text; nothing appended
    NoReply,
    /// `last_error` was set
    Failed(ChatError),
    /// The submission task died before finishing
    Aborted,
}

/// Handle to an accepted submission. Dropping it does not cancel anything.
#[derive(Debug)]
pub struct Submission {
    handle: JoinHandle<SubmissionOutcome>,
}

impl Submission {
    pub async fn wait(self) -> SubmissionOutcome {
        self.handle.await.unwrap_or(SubmissionOutcome::Aborted)
    }
}

/// Clears `pending` if the submission task unwinds before applying its result.
struct PendingGuard {
    state: Arc<watch::Sender<ConversationState>>,
    armed: bool,
}

impl PendingGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|s| {
                s.pending = false;
                s.last_error = Some(UNEXPECTED_ERROR.to_string());
            });
        }
    }
}

#[derive(Clone)]
pub struct ConversationController {
    transport: Arc<dyn ChatTransport>,
    settings: RequestSettings,
    state: Arc<watch::Sender<ConversationState>>,
}

impl ConversationController {
    pub fn new(transport: Arc<dyn ChatTransport>, settings: RequestSettings) -> Self {
        let (state, _) = watch::channel(ConversationState::default());
        Self {
            transport,
            settings,
            state: Arc::new(state),
        }
    }

    /// Current state, cloned
    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending
    }

    /// Replace the input buffer
    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.draft = text);
    }

    /// Submit the input buffer under the same rules as [`Self::submit_turn`]
    pub fn submit_draft(&self) -> Option<Submission> {
        let draft = self.state.borrow().draft.clone();
        self.submit_turn(&draft)
    }

    /// Append a user turn and send the conversation.
    ///
    /// Returns `None` without touching anything when `text` is blank or a
    /// submission is already pending. Otherwise the user turn and `pending`
    /// are published before the request goes out. Outside a Tokio runtime
    /// nothing can be sent, so the call is rejected the same way.
    pub fn submit_turn(&self, text: &str) -> Option<Submission> {
        let text = text.trim();
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("Submission rejected: no Tokio runtime");
            return None;
        };
        let mut request = None;

        self.state.send_if_modified(|s| {
            if text.is_empty() || s.pending {
                return false;
            }
            s.turns.push(Turn::user(text));
            s.last_error = None;
            s.pending = true;
            s.draft.clear();
            request = Some(self.settings.build_request(&s.turns));
            true
        });

        let request = request?;
        tracing::debug!(turns = request.messages.len(), "Submitting conversation");

        let handle = runtime.spawn(run_submission(
            Arc::clone(&self.transport),
            Arc::clone(&self.state),
            request,
        ));
        Some(Submission { handle })
    }

    /// Drop every turn and the last error.
    ///
    /// An in-flight submission is not cancelled; its reply lands in the
    /// emptied conversation.
    pub fn clear_conversation(&self) {
        self.state.send_modify(|s| {
            s.turns.clear();
            s.last_error = None;
        });
    }
}

async fn run_submission(
    transport: Arc<dyn ChatTransport>,
    state: Arc<watch::Sender<ConversationState>>,
    request: ChatRequest,
) -> SubmissionOutcome {
    let guard = PendingGuard {
        state: Arc::clone(&state),
        armed: true,
    };

    let outcome = match transport.send(&request).await {
        Ok(reply) => reply
            .reply_text()
            .map_or(SubmissionOutcome::NoReply, |text| {
                SubmissionOutcome::Reply(Turn::assistant(text))
            }),
        Err(e) => {
            tracing::warn!(status = ?e.http_status(), error = %e, "Chat submission failed");
            SubmissionOutcome::Failed(e)
        }
    };

    state.send_modify(|s| {
        match &outcome {
            SubmissionOutcome::Reply(turn) => s.turns.push(turn.clone()),
            SubmissionOutcome::Failed(e) => s.last_error = Some(e.to_string()),
            SubmissionOutcome::NoReply | SubmissionOutcome::Aborted => {}
        }
        s.pending = false;
    });
    guard.disarm();

    outcome
}
