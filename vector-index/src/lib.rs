//! Client for the hosted vector index.
//!
//! Public API:
//! - [`config::IndexConfig`] — env-driven connection settings
//! - [`index_client::PineconeIndex`] — top-k similarity query with metadata

pub mod config;
pub mod errors;
pub mod index_client;
pub mod structs;

pub use config::IndexConfig;
pub use errors::vector_index_error::VectorIndexError;
pub use index_client::PineconeIndex;
pub use structs::query_match::QueryMatch;
