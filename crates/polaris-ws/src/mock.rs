//! Scripted [`StreamingApi`] implementation for tests
//!
//! `MockStreamingApi` records every call and plays back queued responses
//! and subscribe scripts, so orchestration logic can be tested without a
//! gateway or a WebSocket server.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use polaris_types::{Level1SubscriptionRequest, PolarisError, PolarisResult, StreamResponse};
use tokio_util::sync::CancellationToken;

use crate::api::{MessageHandler, StreamingApi};

/// Scripted behavior for one `subscribe` call
#[derive(Debug, Clone)]
pub enum SubscribeScript {
    /// Feed messages, then hold the stream open until cancellation
    WaitForCancel { messages: Vec<String> },
    /// Feed messages, then return `Ok(())` without being cancelled
    CompleteCleanly { messages: Vec<String> },
    /// Feed messages, then fail with a connection error
    Fault { messages: Vec<String>, reason: String },
}

impl SubscribeScript {
    /// Hold the stream open until cancellation, feeding nothing
    pub fn wait_for_cancel() -> Self {
        Self::WaitForCancel { messages: Vec::new() }
    }

    /// Feed the given messages, then wait for cancellation
    pub fn feed_then_wait(messages: Vec<String>) -> Self {
        Self::WaitForCancel { messages }
    }

    /// Feed the given messages, then complete without cancellation
    pub fn feed_then_complete(messages: Vec<String>) -> Self {
        Self::CompleteCleanly { messages }
    }

    /// Fail immediately with a connection error
    pub fn fault(reason: impl Into<String>) -> Self {
        Self::Fault {
            messages: Vec::new(),
            reason: reason.into(),
        }
    }

    /// Feed the given messages, then fail with a connection error
    pub fn feed_then_fault(messages: Vec<String>, reason: impl Into<String>) -> Self {
        Self::Fault {
            messages,
            reason: reason.into(),
        }
    }
}

/// Recording mock for [`StreamingApi`]
///
/// Queued create results and subscribe scripts are consumed in order; when
/// a queue is empty, `create_level1_stream` answers with a plain 200 and
/// `subscribe` waits for cancellation.
#[derive(Default)]
pub struct MockStreamingApi {
    create_results: Mutex<VecDeque<PolarisResult<StreamResponse>>>,
    scripts: Mutex<VecDeque<SubscribeScript>>,
    create_calls: Mutex<Vec<Level1SubscriptionRequest>>,
    subscribe_calls: Mutex<Vec<String>>,
}

impl MockStreamingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next `create_level1_stream` call
    pub fn push_create_result(&self, result: PolarisResult<StreamResponse>) {
        self.create_results.lock().push_back(result);
    }

    /// Queue a script for the next `subscribe` call
    pub fn push_subscribe_script(&self, script: SubscribeScript) {
        self.scripts.lock().push_back(script);
    }

    /// Requests passed to `create_level1_stream`, in call order
    pub fn create_calls(&self) -> Vec<Level1SubscriptionRequest> {
        self.create_calls.lock().clone()
    }

    pub fn create_call_count(&self) -> usize {
        self.create_calls.lock().len()
    }

    /// URLs passed to `subscribe`, in call order
    pub fn subscribed_urls(&self) -> Vec<String> {
        self.subscribe_calls.lock().clone()
    }

    pub fn subscribe_call_count(&self) -> usize {
        self.subscribe_calls.lock().len()
    }

    fn accepted_response() -> StreamResponse {
        StreamResponse {
            status_code: 200,
            ..Default::default()
        }
    }
}

#[async_trait]
impl StreamingApi for MockStreamingApi {
    async fn create_level1_stream(
        &self,
        request: &Level1SubscriptionRequest,
    ) -> PolarisResult<StreamResponse> {
        self.create_calls.lock().push(request.clone());
        self.create_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Self::accepted_response()))
    }

    async fn subscribe(
        &self,
        url: &str,
        on_message: MessageHandler,
        cancel: CancellationToken,
    ) -> PolarisResult<()> {
        self.subscribe_calls.lock().push(url.to_string());
        if cancel.is_cancelled() {
            return Ok(());
        }

        let script = self
            .scripts
            .lock()
            .pop_front()
            .unwrap_or_else(SubscribeScript::wait_for_cancel);

        match script {
            SubscribeScript::WaitForCancel { messages } => {
                for message in messages {
                    on_message(message);
                }
                cancel.cancelled().await;
                Ok(())
            }
            SubscribeScript::CompleteCleanly { messages } => {
                for message in messages {
                    on_message(message);
                }
                Ok(())
            }
            SubscribeScript::Fault { messages, reason } => {
                for message in messages {
                    on_message(message);
                }
                Err(PolarisError::connection(url, reason))
            }
        }
    }
}
