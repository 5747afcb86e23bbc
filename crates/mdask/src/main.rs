//! Ask a model from the command line and pretty-print the answer.

#[macro_use]
extern crate tracing;

use std::env;
use std::process::ExitCode;

use mdask::Ask;
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncReadExt};

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer in well-structured Markdown.";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(prompt) = read_prompt().await else {
        eprintln!("usage: mdask <prompt>...");
        eprintln!("       (or pipe the prompt via stdin)");
        return ExitCode::FAILURE;
    };

    let system_prompt = env::var("MDASK_SYSTEM_PROMPT")
        .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_owned());

    let result = Ask::new(prompt)
        .with_system_prompt(system_prompt)
        .run()
        .await;

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn read_prompt() -> Option<String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if !args.is_empty() {
        let prompt = args.join(" ");
        return (!prompt.trim().is_empty()).then_some(prompt);
    }

    // No arguments, read the prompt from stdin.
    let mut input = String::new();
    match io::stdin().read_to_string(&mut input).await {
        Ok(_) => (!input.trim().is_empty()).then_some(input),
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
