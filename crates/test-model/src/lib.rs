//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use mdask_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Error {
    /// Returns the error message.
    pub fn message(&self) -> &str {
        self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    deltas: VecDeque<String>,
    fail_after: Option<usize>,
    consumed: usize,
    completed: bool,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Debug for TestModelResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestModelResponse")
            .field("deltas", &self.deltas)
            .field("fail_after", &self.fail_after)
            .field("consumed", &self.consumed)
            .field("completed", &self.completed)
            .field("delay", &self.delay)
            .finish()
    }
}

impl TestModelResponse {
    fn new(preset: PresetResponse, delay: Duration) -> Self {
        Self {
            deltas: preset.deltas.into(),
            fail_after: preset.fail_after,
            consumed: 0,
            completed: false,
            delay,
            sleep: None,
        }
    }
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            loop {
                if !this.completed && this.fail_after == Some(this.consumed) {
                    return Poll::Ready(Err(Error {
                        message: "scripted mid-stream failure",
                        kind: ErrorKind::Other,
                    }));
                }

                let Some(delta) = this.deltas.pop_front() else {
                    if !this.completed {
                        this.completed = true;
                        return Poll::Ready(Ok(Some(
                            ModelResponseEvent::Completed(
                                ModelFinishReason::Stop,
                            ),
                        )));
                    }
                    // In case this method is called after completion.
                    return Poll::Ready(Ok(None));
                };
                this.consumed += 1;

                if !delta.is_empty() {
                    return Poll::Ready(Ok(Some(
                        ModelResponseEvent::MessageDelta(delta),
                    )));
                }
                // Empty deltas model control-only fragments.
            }
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

/// Preset-driven fake model provider.
///
/// Every request is recorded and can be inspected later, so tests can
/// assert on the exact conversation shape that was sent.
#[derive(Clone, Debug, Default)]
pub struct TestModelProvider {
    response: Option<PresetResponse>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl TestModelProvider {
    /// Creates a provider that answers every request with the given
    /// preset.
    #[inline]
    pub fn with_response(response: PresetResponse) -> Self {
        Self {
            response: Some(response),
            delay: None,
            requests: Default::default(),
        }
    }

    /// Overrides the delay before each event. The default is 1ms, so
    /// polling is always exercised asynchronously.
    #[inline]
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = Some(delay);
    }

    /// Returns the requests that have been sent to this provider, in
    /// order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        self.requests.lock().unwrap().push(req.clone());

        // A provider without a preset rejects the request up front, which
        // models failures that surface before any streaming happens.
        let result = match &self.response {
            Some(preset) => Ok(TestModelResponse::new(
                preset.clone(),
                self.delay.unwrap_or(Duration::from_millis(1)),
            )),
            None => Err(Error {
                message: "no preset response",
                kind: ErrorKind::Other,
            }),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use super::*;

    async fn drain(resp: TestModelResponse) -> Result<String, Error> {
        let mut resp = pin!(resp);
        let mut transcript = String::new();
        loop {
            match poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await? {
                Some(ModelResponseEvent::MessageDelta(delta)) => {
                    transcript.push_str(&delta);
                }
                Some(ModelResponseEvent::Completed(_)) | None => break,
            }
        }
        Ok(transcript)
    }

    #[tokio::test]
    async fn test_preset_playback() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["Hel", "", "lo, ", "World!"]),
        );
        let req = ModelRequest::single_turn("sys", "usr");
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(drain(resp).await.unwrap(), "Hello, World!");
        assert_eq!(provider.requests(), vec![req]);
    }

    #[tokio::test]
    async fn test_no_preset_fails_up_front() {
        let provider = TestModelProvider::default();
        let req = ModelRequest::single_turn("", "");
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        // The request is still recorded.
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_mid_stream_failure() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["a", "b", "c"]).failing_after(2),
        );
        let req = ModelRequest::single_turn("", "");
        let resp = provider.send_request(&req).await.unwrap();
        assert!(drain(resp).await.is_err());
    }
}
