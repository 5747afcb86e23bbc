//! Terminal display surfaces.

use bat::{PrettyPrinter, WrappingMode};
use mdask_core::render::{Render, RenderError};

/// Renders the response as Markdown in the terminal.
///
/// Pretty-printing is delegated to `bat`, which takes care of
/// headings, emphasis and syntax-highlighted code blocks.
#[derive(Clone, Debug, Default)]
pub struct MarkdownRenderer {
    theme: Option<String>,
}

impl MarkdownRenderer {
    /// Creates a renderer with the default theme.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the color theme.
    #[inline]
    pub fn with_theme<S: Into<String>>(mut self, theme: S) -> Self {
        self.theme = Some(theme.into());
        self
    }
}

impl Render for MarkdownRenderer {
    fn render(&self, text: &str) -> Result<(), RenderError> {
        let mut printer = PrettyPrinter::new();
        printer
            .input_from_bytes(text.as_bytes())
            .language("Markdown")
            .wrapping_mode(WrappingMode::Character);
        if let Some(theme) = &self.theme {
            printer.theme(theme);
        }
        printer.print().map(|_| ()).map_err(Into::into)
    }
}

/// Writes the raw text to stdout, for surfaces where ANSI styling is
/// unwanted.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainRenderer;

impl Render for PlainRenderer {
    fn render(&self, text: &str) -> Result<(), RenderError> {
        use std::io::Write as _;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        Ok(())
    }
}
