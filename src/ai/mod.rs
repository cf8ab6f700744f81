//! AI backends and streaming dispatch

pub mod dispatch;
pub mod models;
pub mod openai;
pub mod sse;

pub use dispatch::send_prompt;
pub use models::{Backend, ModelName};
pub use openai::OpenAiCompatClient;
