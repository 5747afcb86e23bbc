use std::error::Error as StdError;
use std::fmt::{self, Display};

use mdask_core::render::Render;
use mdask_core::{Error as RunError, PromptRunner};
use mdask_openai_model::OpenAIProvider;

use crate::render::MarkdownRenderer;

/// One prompt→response cycle, configured with a builder.
///
/// The cycle sends the system directive and the user prompt to an
/// OpenAI-compatible endpoint, accumulates the streamed answer,
/// renders it through the configured display surface and resolves to
/// the accumulated text. See the crate-level docs for an example.
///
/// When no provider handle is injected, a default one is built from
/// the ambient environment the moment [`run`](Ask::run) is called.
/// Callers that want a non-OpenAI backend can use
/// [`PromptRunner`] from the core crate directly.
pub struct Ask<R = MarkdownRenderer> {
    prompt: String,
    system_prompt: String,
    model: Option<String>,
    provider: Option<OpenAIProvider>,
    renderer: R,
}

impl Ask {
    /// Creates a request for the given user prompt, displaying the
    /// answer as Markdown.
    pub fn new<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: String::new(),
            model: None,
            provider: None,
            renderer: MarkdownRenderer::new(),
        }
    }
}

impl<R> Ask<R> {
    /// Sets the system directive that frames the response.
    ///
    /// The directive is always the first message of the conversation.
    /// It defaults to the empty string, which is sent as-is.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(
        mut self,
        system_prompt: S,
    ) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Selects the hosted model variant that answers the request.
    ///
    /// When omitted, the provider's pinned default
    /// ([`mdask_openai_model::DEFAULT_MODEL`]) is used.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Injects a pre-configured provider handle.
    ///
    /// When a handle is supplied, no default handle is constructed and
    /// the ambient environment is never consulted.
    #[inline]
    pub fn with_provider(mut self, provider: OpenAIProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replaces the display surface.
    #[inline]
    pub fn with_renderer<R2: Render>(self, renderer: R2) -> Ask<R2> {
        Ask {
            prompt: self.prompt,
            system_prompt: self.system_prompt,
            model: self.model,
            provider: self.provider,
            renderer,
        }
    }
}

impl<R: Render> Ask<R> {
    /// Executes the cycle and returns the accumulated response text.
    ///
    /// The call doesn't resolve until the streamed response has been
    /// fully delivered, and the answer is rendered before it is
    /// returned. Failures propagate as-is: nothing is rendered or
    /// returned when the provider fails, and a failing display surface
    /// withholds the (already computed) answer.
    pub async fn run(self) -> Result<String, AskError> {
        let provider = match self.provider {
            Some(provider) => provider,
            None => {
                debug!("no provider injected, building one from the env");
                OpenAIProvider::from_env().map_err(AskError::Construct)?
            }
        };

        let runner = PromptRunner::new(provider, self.renderer);
        let text = runner
            .run(&self.prompt, &self.system_prompt, self.model.as_deref())
            .await?;
        Ok(text)
    }
}

/// The error type for [`Ask::run`].
#[derive(Debug)]
pub enum AskError {
    /// The default provider handle could not be constructed, e.g. the
    /// ambient environment carries no API key. Surfaces before any
    /// network call.
    Construct(mdask_openai_model::Error),
    /// The cycle itself failed, in the provider or in the display
    /// surface.
    Run(RunError),
}

impl Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AskError::Construct(err) => write!(f, "{err}"),
            AskError::Run(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for AskError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AskError::Construct(err) => Some(err),
            AskError::Run(err) => Some(err),
        }
    }
}

impl From<RunError> for AskError {
    fn from(err: RunError) -> Self {
        AskError::Run(err)
    }
}
