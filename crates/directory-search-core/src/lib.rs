//! # Directory Search Core
//!
//! Shared, I/O-free logic for Directory Search: record models, the prefix
//! index, the query engine, record store state, the [`RecordSource`]
//! abstraction, and the session state machine.
//!
//! This crate contains no tokio, networking, or filesystem dependencies.
//! Timers and HTTP live in the `directory-search` app crate.
//!
//! [`RecordSource`]: store::RecordSource

pub mod index;
pub mod models;
pub mod query;
pub mod state;
pub mod store;
