//! # Directory Search
//!
//! Incremental, debounced, multi-word prefix search over a user directory
//! loaded from a remote JSON endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ RecordSource │──▶│ Record Store │──▶│ Prefix Index │
//! │  (HTTP GET)  │   │ load/status  │   │ full rebuild │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!   keystrokes ──▶ Debouncer ──▶ Query Engine ◀┘
//!                                     │
//!                                     ▼
//!                           SearchSession snapshot
//! ```
//!
//! ## Data Flow
//!
//! 1. The session loads records once at startup through a
//!    [`RecordSource`](directory_search_core::store::RecordSource)
//!    ([`source::HttpRecordSource`] in production).
//! 2. Every collection change rebuilds the
//!    [`PrefixIndex`](directory_search_core::index::PrefixIndex) and
//!    re-runs the current term.
//! 3. Input goes through [`session::SearchSession::set_search_term`]; the
//!    [`debounce::Debouncer`] collapses bursts into one query.
//! 4. The filtered view and status are read from the session or received
//!    from its `watch` channel.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`source`] | HTTP record source |
//! | [`debounce`] | Trailing-edge debounce scheduler |
//! | [`session`] | Search session coordinator |
//! | [`render`] | CLI result rendering |

pub mod config;
pub mod debounce;
pub mod render;
pub mod session;
pub mod source;
