//! Mock transport for controller tests

use super::transport::{ChatError, ChatTransport};
use crate::api::wire::{ChatReply, ChatRequest};
use crate::llm::ContentBlock;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Transport that returns queued replies, optionally holding each send until
/// the test releases it.
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ChatReply, ChatError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<ChatRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
    panic: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
            panic: AtomicBool::new(false),
        }
    }

    pub fn queue_reply(&self, reply: ChatReply) {
        self.responses.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a reply carrying a single text block
    pub fn queue_text(&self, text: &str) {
        self.queue_reply(ChatReply {
            model: "mock-model".to_string(),
            content: vec![ContentBlock::text(text)],
            ..Default::default()
        });
    }

    pub fn queue_error(&self, error: ChatError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Make every following send wait for a `notify_one` on the returned handle
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn panic_on_send(&self) {
        self.panic.store(true, Ordering::SeqCst);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        self.requests.lock().unwrap().push(request.clone());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        assert!(!self.panic.load(Ordering::SeqCst), "mock transport panicked");

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Network("No mock response queued".to_string())))
    }
}
