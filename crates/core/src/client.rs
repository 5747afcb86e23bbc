use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use mdask_model::{
    ModelFinishReason, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ModelResponseEvent,
};
use tracing::Instrument;

type SendRequestResult = Result<ClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that drains streamed responses
/// into complete transcripts and provides a type-erased interface for
/// the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    /// Wraps the given model provider.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp_or_err = fut.await;
                    handle_response::<P>(resp_or_err).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and drains the streamed response into a
    /// [`ClientResponse`].
    ///
    /// The call doesn't resolve until the upstream event sequence has
    /// been exhausted. If an error surfaces mid-stream, the partially
    /// accumulated transcript is discarded along with the response, and
    /// dropping the response releases the underlying connection.
    #[inline]
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        (self.handler_fn)(req).await
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug)]
pub struct ClientResponse {
    /// The accumulated message text, concatenated in delta arrival
    /// order with no reordering or separator insertion.
    pub transcript: String,
    /// The reason the model finished generating, if it reported one.
    pub finish_reason: Option<ModelFinishReason>,
}

async fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
) -> SendRequestResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    let mut transcript = String::new();
    let mut finish_reason = None;

    trace!("start receiving events");

    let mut pinned_resp = pin!(resp);
    loop {
        let event_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_event(cx)).await;
        let event = match event_or_err {
            Ok(event) => event,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };

        let Some(event) = event else {
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::MessageDelta(msg) => {
                transcript.push_str(&msg);
            }
            ModelResponseEvent::Completed(reason) => {
                finish_reason = Some(reason);
            }
        }
    }

    trace!("finished a request");

    Ok(ClientResponse {
        transcript,
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use mdask_test_model::{PresetResponse, TestModelProvider};

    use super::*;

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["How ", "are ", "you?"]),
        );
        let client = ModelClient::new(provider);

        for _ in 0..3 {
            let resp = client
                .send_request(ModelRequest::single_turn("", "Hi"))
                .await
                .unwrap();
            assert_eq!(resp.transcript, "How are you?");
            assert_eq!(resp.finish_reason, Some(ModelFinishReason::Stop));
        }
    }

    #[tokio::test]
    async fn test_no_delta_fragments_skipped() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["Hel", "", "lo, ", "World!"]),
        );
        let client = ModelClient::new(provider);
        let resp = client
            .send_request(ModelRequest::single_turn("", "Hi"))
            .await
            .unwrap();
        assert_eq!(resp.transcript, "Hello, World!");
    }

    #[tokio::test]
    async fn test_error_handling() {
        let provider = TestModelProvider::default();
        let client = ModelClient::new(provider);
        let resp_or_err =
            client.send_request(ModelRequest::single_turn("", "Hi")).await;
        assert!(matches!(resp_or_err, Err(_)));
    }

    #[tokio::test]
    async fn test_mid_stream_error_discards_partial() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["a", "b", "c"]).failing_after(2),
        );
        let client = ModelClient::new(provider);
        let resp_or_err =
            client.send_request(ModelRequest::single_turn("", "Hi")).await;
        assert!(matches!(resp_or_err, Err(_)));
    }
}
