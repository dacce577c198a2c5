//! Generation provider abstractions.
//!
//! - `LlmProvider`: RPITIT trait for concrete backend implementations
//! - `BoxLlmProvider`: object-safe wrapper chosen once at startup
//! - `collect_text`: drains a token stream into the final reply text

pub mod box_provider;
pub mod provider;
pub mod stream;
