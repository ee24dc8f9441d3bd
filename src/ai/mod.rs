pub mod client;
pub mod interpreter;
pub mod prompts;
mod stream;
pub mod tools;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::{LanguageModel, OpenAiModel};
pub use interpreter::Interpreter;
