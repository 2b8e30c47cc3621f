//! REST client for the society backend. One `impl ApiClient` block per
//! resource.

pub mod auth;
pub mod bulk_mail;
pub mod client;
pub mod members;
pub mod notices;

pub use client::{api_error, ApiClient};
