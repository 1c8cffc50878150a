//! TrackShield Blocklist Ingestion
//!
//! This crate turns blocklist wire formats into the typed structures the
//! matcher consumes: the native entity format and the Disconnect-style
//! category map both produce a [`shield_core::BlockList`], and the entity
//! list format produces a [`shield_core::EntityWhitelist`].

pub mod parser;

pub use parser::{parse_block_list, parse_disconnect_list, parse_entity_list, ParseError};
