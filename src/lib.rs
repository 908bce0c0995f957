//! Deterministic intent resolution for German smart-home voice commands
//!
//! This crate is the fast path of a voice-command front end: it takes one
//! line of natural-language German text and either resolves it to a device
//! state mutation without any language model, or signals the caller to fall
//! through to its LLM pipeline.
//!
//! Three components cooperate:
//!
//! - [`resolver::EnumResolver`] indexes the store's room and function
//!   groupings and maps fuzzy names to device state identifiers
//! - [`parser::IntentParser`] turns free text into a [`parser::ParsedIntent`]
//!   with a confidence score, or `None`
//! - [`executor::FastPathExecutor`] applies a sufficiently confident intent
//!   to the store and builds a templated confirmation
//!
//! The persistent object/state store stays behind the narrow async
//! [`store::ObjectStore`] trait; speech-to-text, text-to-speech and the LLM
//! pipeline are entirely outside this crate.
//!
//! # Example
//!
//! ```no_run
//! use smarthome_intent::{
//!     config::FastPathConfig, executor::FastPathExecutor, parser::IntentParser,
//!     resolver::EnumResolver, store::ObjectStore,
//! };
//! use std::sync::Arc;
//!
//! # async fn run(store: Arc<dyn ObjectStore>) {
//! let config = FastPathConfig::default();
//! let resolver = Arc::new(EnumResolver::new(store.clone(), config.clone()));
//! resolver.load().await;
//!
//! let parser = IntentParser::new(resolver.clone());
//! let executor = FastPathExecutor::new(store, resolver, config);
//!
//! if let Some(intent) = parser.parse("Licht im Wohnzimmer ein").await {
//!     if let Some(result) = executor.execute(&intent).await {
//!         println!("{}", result.confirmation);
//!         return;
//!     }
//! }
//! // fall through to the LLM pipeline
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod parser;
pub mod resolver;
pub mod store;

// Test support module, also useful for embedders' own tests
pub mod mock;

pub use config::FastPathConfig;
pub use error::{IntentError, Result};
pub use executor::{FastPathExecutor, FastPathResult};
pub use parser::{Action, IntentParser, ParsedIntent};
pub use resolver::EnumResolver;

/// Initialize tracing with an `RUST_LOG`-style environment filter
///
/// Convenience for embedders and examples; library code only emits events.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
