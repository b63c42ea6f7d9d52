//! # Algorithms Module
//!
//! Pure functions used by the domain and the engine.

pub mod hashing;

pub use hashing::{compute_message_id, payload_digest, statement_digest};
