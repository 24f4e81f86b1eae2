//! Client-side conversation handling
//!
//! A [`ConversationController`] is created per chat session by whatever
//! renders it, and dropped with the session. It talks to `POST /api/chat`
//! through a [`ChatTransport`].

mod controller;
mod state;
mod transport;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ConversationController, RequestSettings, Submission, SubmissionOutcome};
pub use state::{ConversationState, Turn};
pub use transport::{ChatError, ChatTransport, HttpChatTransport};
