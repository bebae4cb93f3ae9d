//! OpenAI API client.
//!
//! [`ApiClient`] owns the HTTP stack; [`AuthenticatedClient`] binds it to a
//! credential for the lifetime of a probe.

mod client;
mod types;

pub use client::{ApiClient, ApiError, AuthenticatedClient};
pub use types::{CreateResponseRequest, Usage};
