//! Crate includes reusable utils for services that handle common behavior.
//! Such as initializing the tracing framework and reading env overrides.

pub mod env;
pub mod logging;
