//! Client for the pricing backend's REST API.

pub mod client;
pub mod error;
pub mod types;
pub mod upload;
