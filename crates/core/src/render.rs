//! The display seam.
//!
//! Accumulation is a pure computation (text in, text out); presenting
//! the result is a side effect behind the [`Render`] trait, so the
//! runner can be exercised without a real display surface.

use std::error::Error as StdError;

/// The error type a rendering surface may fail with.
pub type RenderError = Box<dyn StdError + Send + Sync>;

/// A display surface that presents the finalized response text.
pub trait Render {
    /// Renders the given text.
    ///
    /// The text is always the complete response, never a fragment, and
    /// may be empty.
    fn render(&self, text: &str) -> Result<(), RenderError>;
}

impl<F> Render for F
where
    F: Fn(&str) -> Result<(), RenderError>,
{
    fn render(&self, text: &str) -> Result<(), RenderError> {
        self(text)
    }
}
