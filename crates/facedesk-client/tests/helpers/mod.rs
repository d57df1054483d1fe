//! Test helpers for facedesk-client integration tests.

#![allow(dead_code)]

pub mod mock_backend;

pub use mock_backend::{FormField, MockBackend, RecordedRequest, Reply};
