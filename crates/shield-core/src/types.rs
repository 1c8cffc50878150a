//! Shared type definitions for the matching engine.

use std::sync::Arc;

// =============================================================================
// Blocklist data
// =============================================================================

/// A named group of tracker patterns sharing a category (e.g. an analytics
/// company and all the domains it serves from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Display name, e.g. "ExampleAds".
    pub name: String,
    /// Category tag used for category-level toggles, e.g. "Advertising".
    pub category: String,
    /// Domain suffix patterns owned by this entity.
    pub patterns: Vec<String>,
}

/// A versioned collection of entities, as delivered by the list
/// distribution mechanism.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    /// Free-form source/version identifier, e.g. "bundled-2024-06".
    pub source: String,
    pub entities: Vec<Entity>,
}

// =============================================================================
// Verdicts
// =============================================================================

/// Why a verdict came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    /// A third-party request matched a blocklist pattern.
    ThirdPartyBlocked,
    /// Top-level navigations are never blocked, even to listed hosts.
    MainFrameException,
    /// Requests to the current page's own host are never blocked.
    FirstPartyException,
    /// No pattern matched, or the matching category is disabled.
    NoMatch,
}

/// Decision for a single intercepted request. Produced fresh per request,
/// never persisted.
#[derive(Debug, Clone)]
pub struct MatchVerdict {
    pub blocked: bool,
    /// The entity whose pattern matched, when one did. Heuristic blocks
    /// (favicons, webfonts) carry no entity.
    pub matched_entity: Option<Arc<Entity>>,
    pub reason: MatchReason,
}

impl MatchVerdict {
    pub(crate) fn allow(reason: MatchReason) -> Self {
        Self {
            blocked: false,
            matched_entity: None,
            reason,
        }
    }

    pub(crate) fn block(matched_entity: Option<Arc<Entity>>) -> Self {
        Self {
            blocked: true,
            matched_entity,
            reason: MatchReason::ThirdPartyBlocked,
        }
    }
}

// =============================================================================
// Scheme Mask
// =============================================================================

bitflags::bitflags! {
    /// URL scheme mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SchemeMask: u8 {
        const HTTP = 1 << 0;
        const HTTPS = 1 << 1;
        const WS = 1 << 2;
        const WSS = 1 << 3;
        const DATA = 1 << 4;
        /// Schemes whose resources are subject to blocking.
        const WEB = Self::HTTP.bits() | Self::HTTPS.bits() | Self::WS.bits() | Self::WSS.bits();
    }
}
