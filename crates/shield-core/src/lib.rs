//! TrackShield Core Library
//!
//! This crate provides the core matching engine for the TrackShield tracking
//! protection component. For every resource request a page issues, the engine
//! decides in microseconds whether to allow the request or serve an empty
//! response, based on a blocklist of domain patterns grouped into entities
//! with category tags, layered with first-party and main-frame exceptions.
//!
//! # Architecture
//!
//! Blocklist data is compiled once into an immutable reversed-host trie and
//! published by atomic swap, so the hot path never takes a lock on the rule
//! data and never observes a half-built structure. Matching itself allocates
//! nothing beyond a bounded cache entry and has no suspension points; it is
//! safe to call synchronously from the rendering engine's interception
//! thread.
//!
//! # Modules
//!
//! - `strview`: zero-copy forward/reverse views used during matching
//! - `trie`: reversed-host pattern trie with longest-match lookup
//! - `types`: entities, blocklists, verdicts
//! - `url`: fast scheme/host/path extraction without allocations
//! - `whitelist`: related-company domains that don't count as third parties
//! - `matcher`: the verdict engine
//! - `session`: per-tab adapter between the rendering engine and the matcher

pub mod matcher;
pub mod session;
pub mod strview;
pub mod trie;
pub mod types;
pub mod url;
pub mod whitelist;

// Re-export commonly used types
pub use matcher::{LoadReport, MatcherOptions, UrlMatcher};
pub use session::{BlockedResource, RequestInterceptor, TrackingSession};
pub use strview::StrView;
pub use trie::{EntityId, Trie};
pub use types::{BlockList, Entity, MatchReason, MatchVerdict, SchemeMask};
pub use whitelist::{EntityWhitelist, HostSet};
