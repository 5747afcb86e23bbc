/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// Identifier of the model variant that should answer the request.
    ///
    /// `None` selects the provider's pinned default. Carrying the
    /// override here keeps model selection independent from which
    /// provider handle serves the request.
    pub model: Option<String>,
    /// The input messages, in the order they are sent on the wire.
    pub messages: Vec<ModelMessage>,
}

impl ModelRequest {
    /// Creates the canonical single-turn request: the system directive
    /// first, then the user prompt.
    ///
    /// Both contents are passed through verbatim and may be empty.
    #[inline]
    pub fn single_turn<S, U>(system_prompt: S, prompt: U) -> Self
    where
        S: Into<String>,
        U: Into<String>,
    {
        Self {
            model: None,
            messages: vec![
                ModelMessage::System(system_prompt.into()),
                ModelMessage::User(prompt.into()),
            ],
        }
    }

    /// Sets the model override for this request.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
}
