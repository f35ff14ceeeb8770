//! # huddle-store
//!
//! Local durable storage for the Huddle client.
//!
//! The crate exposes a small key/value abstraction ([`KeyValueStore`]) with a
//! SQLite-backed implementation ([`Database`]) and an in-memory one
//! ([`MemoryStore`]), plus the [`MessageCache`] that keeps the last remote
//! message snapshot under a single well-known key.

pub mod cache;
pub mod database;
pub mod kv;
pub mod memory;
pub mod migrations;

mod error;

pub use cache::MessageCache;
pub use database::Database;
pub use error::StoreError;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
