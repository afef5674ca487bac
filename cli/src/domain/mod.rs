//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `reqwest`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod digest;
pub mod error;
pub mod manifest;
pub mod path;
pub mod registry;
pub mod retry;
pub mod signing;

pub use error::{IndexError, PathError, PublishError, RegistryUrlError};
pub use registry::{RegistryRef, parse_registry_url};
pub use retry::{AttemptError, RetryError, RetryPolicy};
pub use signing::SigningError;
