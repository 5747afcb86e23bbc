use mdask_model::{ModelProvider, ModelRequest};

use crate::client::{ClientResponse, ModelClient};
use crate::error::Error;
use crate::render::Render;

/// Executes one prompt→response cycle end-to-end and presents the
/// result.
///
/// A cycle sends a two-message conversation (the system directive
/// followed by the user prompt), drains the streamed completion into a
/// single transcript, renders that transcript on the display surface
/// and returns it. The runner holds no state between cycles.
pub struct PromptRunner<R> {
    client: ModelClient,
    renderer: R,
}

impl<R: Render> PromptRunner<R> {
    /// Creates a runner from a model provider and a display surface.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P, renderer: R) -> Self {
        Self {
            client: ModelClient::new(provider),
            renderer,
        }
    }

    /// Creates a runner from an already wrapped client.
    #[inline]
    pub fn with_client(client: ModelClient, renderer: R) -> Self {
        Self { client, renderer }
    }

    /// Runs one cycle and returns the accumulated response text.
    ///
    /// `model` overrides the provider's default model for this request.
    ///
    /// The transcript is rendered exactly once, after the stream has
    /// been drained, and also when it turns out empty. Failures from
    /// either collaborator propagate unchanged; nothing is rendered or
    /// returned on failure, and a rendering failure prevents the
    /// already computed transcript from being returned.
    pub async fn run(
        &self,
        prompt: &str,
        system_prompt: &str,
        model: Option<&str>,
    ) -> Result<String, Error> {
        let mut req = ModelRequest::single_turn(system_prompt, prompt);
        if let Some(model) = model {
            req = req.with_model(model);
        }

        let ClientResponse {
            transcript,
            finish_reason,
        } = self.client.send_request(req).await.map_err(Error::Model)?;
        debug!("model finished: {finish_reason:?}");

        self.renderer.render(&transcript).map_err(Error::Render)?;
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use mdask_model::ModelMessage;
    use mdask_test_model::{PresetResponse, TestModelProvider};

    use super::*;
    use crate::render::RenderError;

    /// Records every rendered text instead of displaying it.
    #[derive(Clone, Default)]
    struct RecordingRenderer {
        rendered: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingRenderer {
        fn rendered(&self) -> Vec<String> {
            self.rendered.lock().unwrap().clone()
        }
    }

    impl Render for RecordingRenderer {
        fn render(&self, text: &str) -> Result<(), RenderError> {
            self.rendered.lock().unwrap().push(text.to_owned());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_accumulates_in_arrival_order() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["Hel", "", "lo, ", "World!"]),
        );
        let renderer = RecordingRenderer::default();
        let runner = PromptRunner::new(provider, renderer.clone());

        let text = runner.run("hi", "be nice", None).await.unwrap();
        assert_eq!(text, "Hello, World!");
        assert_eq!(renderer.rendered(), vec!["Hello, World!".to_owned()]);
    }

    #[tokio::test]
    async fn test_message_shape() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["ok"]),
        );
        let renderer = RecordingRenderer::default();
        let runner = PromptRunner::new(provider.clone(), renderer);

        runner
            .run("what is 2+2?", "You're a mathematician.", None)
            .await
            .unwrap();
        runner.run("", "", Some("gpt-4o")).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);

        assert_eq!(requests[0].model, None);
        assert_eq!(
            requests[0].messages,
            vec![
                ModelMessage::System("You're a mathematician.".to_owned()),
                ModelMessage::User("what is 2+2?".to_owned()),
            ]
        );

        // Empty contents still produce the two-message conversation.
        assert_eq!(requests[1].model.as_deref(), Some("gpt-4o"));
        assert_eq!(
            requests[1].messages,
            vec![
                ModelMessage::System(String::new()),
                ModelMessage::User(String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_response_is_rendered() {
        let provider =
            TestModelProvider::with_response(PresetResponse::default());
        let renderer = RecordingRenderer::default();
        let runner = PromptRunner::new(provider, renderer.clone());

        let text = runner.run("hi", "", None).await.unwrap();
        assert_eq!(text, "");
        // The display surface is still invoked, with the empty string.
        assert_eq!(renderer.rendered(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_stream_failure_skips_rendering() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["a", "b", "c"]).failing_after(2),
        );
        let renderer = RecordingRenderer::default();
        let runner = PromptRunner::new(provider, renderer.clone());

        let result = runner.run("hi", "", None).await;
        assert!(matches!(result, Err(Error::Model(_))));
        assert!(renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_propagates() {
        let provider = TestModelProvider::with_response(
            PresetResponse::with_deltas(["done"]),
        );
        let runner = PromptRunner::new(provider, |_: &str| {
            Err::<(), RenderError>("broken surface".into())
        });

        let result = runner.run("hi", "", None).await;
        assert!(matches!(result, Err(Error::Render(_))));
    }
}
