//! Text generators backed by hosted language models.
//!
//! Both implementations are thin adapters from [`TextGenerator`] onto the
//! `llm-client` REST clients.
//!
//! [`TextGenerator`]: crate::traits::generator::TextGenerator

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicGenerator;
pub use openai::OpenAIGenerator;
