//! facedesk-client — HTTP client for the face-recognition backend.
//!
//! One async function per backend capability, rooted at `<base_url>/api`.

pub mod client;
pub mod config;

pub use client::{ApiClient, ConfigError};
pub use config::ClientConfig;
