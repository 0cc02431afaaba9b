//! HTTP client for the company directory API.

pub mod client;
pub mod error;
mod retry;

pub use client::DirectoryClient;
pub use error::ClientError;
