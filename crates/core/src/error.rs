use std::error::Error as StdError;
use std::fmt::{self, Display};

use mdask_model::ModelProviderError;

use crate::render::RenderError;

/// The error type for a prompt run.
///
/// No local recovery happens anywhere in the runner: every failure is
/// passed through to the caller as-is, wrapped only to tell the two
/// collaborators apart.
#[derive(Debug)]
pub enum Error {
    /// The model provider failed, before or during streaming.
    Model(Box<dyn ModelProviderError>),
    /// The display surface failed after the response was accumulated.
    Render(RenderError),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Model(err) => write!(f, "model provider error: {err}"),
            Error::Render(err) => write!(f, "render error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Model(err) => Some(err.as_ref()),
            Error::Render(err) => Some(err.as_ref()),
        }
    }
}
