//! markwise-providers — scoring-service adapters.
//!
//! Implementations of [`markwise_core::traits::ScoringProvider`] for
//! OpenAI-compatible and Anthropic APIs, a mock scorer for tests, and the
//! configuration/factory plumbing that wires them up.

pub mod anthropic;
pub mod config;
pub mod mock;
pub mod openai;

pub use anthropic::AnthropicScorer;
pub use config::{create_provider, load_config, load_config_from, MarkwiseConfig, ProviderConfig};
pub use mock::MockScorer;
pub use openai::OpenAiScorer;
