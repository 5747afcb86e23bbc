//! Core logic of the prompt runner: conversation assembly, stream
//! accumulation and the display seam.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod client;
mod error;
pub mod render;
mod runner;

pub use client::{ClientResponse, ModelClient};
pub use error::Error;
pub use runner::PromptRunner;
