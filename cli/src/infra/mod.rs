//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: filesystem checks, the OCI
//! registry client, the signing-service client, timers and input loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod fs;
pub mod inputs;
pub mod registry;
pub mod signing;
pub mod sleep;
