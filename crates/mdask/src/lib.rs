//! Ask an OpenAI-compatible model a question and get the streamed
//! answer rendered as Markdown in your terminal.
//!
//! The crate includes a small CLI for using in the terminal. And you
//! can also use it as a library to embed one-shot prompting into your
//! own host apps:
//!
//! ```no_run
//! use mdask::Ask;
//!
//! # async fn demo() -> Result<(), mdask::AskError> {
//! let answer = Ask::new("Explain what this code does: print('Hello')")
//!     .with_system_prompt("You're an experienced programmer.")
//!     .run()
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod ask;
pub mod render;

pub use ask::{Ask, AskError};

/// Re-exports of [`mdask_core`] crate.
pub mod core {
    pub use mdask_core::*;
}

/// Re-exports of [`mdask_openai_model`] crate.
pub mod openai {
    pub use mdask_openai_model::*;
}
