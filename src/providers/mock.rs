/*!
 * Scriptable provider for offline tests.
 *
 * `MockProvider::working()` echoes the user prompt, `replying(f)` answers
 * with `f(request)`, `failing()` returns a 500, `empty()` answers with
 * nothing, and `flaky(n)` fails every n-th request. Clones share one request
 * counter so a test can hand a clone to a service and still count calls.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// What the service was asked
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub system: String,
    pub prompt: String,
    pub json_mode: bool,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub text: String,
}

/// Answer generator
pub type Script = fn(&MockRequest) -> String;

#[derive(Debug, Clone, Copy)]
enum Mode {
    Answer(Option<Script>),
    Fail,
    Empty,
    Flaky { fail_every: usize },
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    mode: Mode,
    delay: Option<Duration>,
    served: Arc<AtomicUsize>,
}

impl MockProvider {
    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            delay: None,
            served: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn working() -> Self {
        Self::with_mode(Mode::Answer(None))
    }

    pub fn replying(script: Script) -> Self {
        Self::with_mode(Mode::Answer(Some(script)))
    }

    pub fn failing() -> Self {
        Self::with_mode(Mode::Fail)
    }

    pub fn empty() -> Self {
        Self::with_mode(Mode::Empty)
    }

    /// Fails requests n, 2n, 3n...; echoes otherwise
    pub fn flaky(fail_every: usize) -> Self {
        Self::with_mode(Mode::Flaky {
            fail_every: fail_every.max(1),
        })
    }

    /// Wait before every answer
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests served by this provider and its clones
    pub fn request_count(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }
}

fn simulated_failure() -> ProviderError {
    ProviderError::ApiError {
        message: "Simulated provider failure".to_string(),
        status_code: 500,
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let nth = self.served.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let text = match self.mode {
            Mode::Answer(Some(script)) => script(&request),
            Mode::Answer(None) => request.prompt,
            Mode::Empty => String::new(),
            Mode::Fail => return Err(simulated_failure()),
            Mode::Flaky { fail_every } if nth % fail_every == 0 => return Err(simulated_failure()),
            Mode::Flaky { .. } => request.prompt,
        };

        Ok(MockResponse { text })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.mode {
            Mode::Fail => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn prompt_request(&self, system: &str, prompt: &str, json_mode: bool) -> Self::Request {
        MockRequest {
            system: system.to_string(),
            prompt: prompt.to_string(),
            json_mode,
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
