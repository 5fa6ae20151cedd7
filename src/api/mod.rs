//! Admin API client and types.
//!
//! This module provides the interface for communicating with the city/country
//! REST API.

pub mod auth;
mod backend;
mod client;
pub mod error;
pub mod types;

pub use auth::TokenSource;
pub use backend::CityBackend;
#[cfg(test)]
pub(crate) use backend::InMemoryBackend;
pub use client::CityClient;
pub use error::ApiError;
pub use types::{City, Country, NewCity};
