//! Object detection module.
//!
//! Wraps the remote detection service:
//! - `models` - wire response and domain `Detection`
//! - `client` - label resolution and failure swallowing
//! - `http` - multipart upload over reqwest

pub mod client;
pub mod http;
pub mod models;

pub use client::*;
pub use http::*;
pub use models::*;
