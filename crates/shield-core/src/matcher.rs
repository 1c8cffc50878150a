//! Tracking protection matcher
//!
//! This is the hot path - every resource request a page issues goes through
//! here, synchronously, on the rendering engine's interception thread. No
//! I/O, no suspension points, no locks on the rule data.
//!
//! Rule sets are compiled off the calling thread and published by atomic
//! swap: in-flight queries always see either the old or the new complete
//! structure, never a partially built one. The per-host verdict cache lives
//! inside the rule set it indexes, so a swap atomically retires stale
//! entries.

use std::borrow::Cow;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{debug, warn};
use lru::LruCache;
use parking_lot::Mutex;

use crate::strview::StrView;
use crate::trie::{EntityId, Trie};
use crate::types::{BlockList, Entity, MatchReason, MatchVerdict, SchemeMask};
use crate::url::{extract_host, extract_path, extract_scheme};
use crate::whitelist::EntityWhitelist;

/// Host-verdict cache capacity per rule set.
const HOST_CACHE_SIZE: usize = 512;

/// Extensions blocked by the webfont toggle.
const WEBFONT_EXTENSIONS: [&str; 4] = [".woff2", ".woff", ".ttf", ".otf"];

// =============================================================================
// Load reporting
// =============================================================================

/// Outcome of a [`UrlMatcher::load_patterns`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Entities accepted into the rule set.
    pub entities: usize,
    /// Patterns inserted into the trie.
    pub patterns: usize,
    /// Malformed entries skipped (empty or duplicate patterns).
    pub skipped: usize,
}

// =============================================================================
// Options
// =============================================================================

/// Matcher-wide options supplied by the embedding application at
/// construction time. Category toggles are runtime state instead, see
/// [`UrlMatcher::set_category_enabled`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MatcherOptions {
    /// Also block third-party webfont requests by file extension.
    pub block_webfonts: bool,
}

// =============================================================================
// Compiled rule set
// =============================================================================

/// A fully built, immutable set of compiled patterns.
struct RuleSet {
    entities: Vec<Arc<Entity>>,
    trie: Trie<EntityId>,
    /// request host -> matched entity id, or None for a miss. The category
    /// toggle is applied after the cache lookup, so toggling never
    /// invalidates cached lookups; only a list swap does, by replacing the
    /// whole rule set.
    host_cache: Mutex<LruCache<String, Option<EntityId>>>,
}

impl RuleSet {
    fn empty() -> Self {
        Self::build(Vec::new(), Trie::new())
    }

    fn build(entities: Vec<Arc<Entity>>, trie: Trie<EntityId>) -> Self {
        let capacity = NonZeroUsize::new(HOST_CACHE_SIZE).expect("cache size is nonzero");
        Self {
            entities,
            trie,
            host_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Trie lookup memoized per host. Holds the cache lock only for the
    /// lookup itself.
    fn lookup(&self, host: &str) -> Option<EntityId> {
        let mut cache = self.host_cache.lock();
        if let Some(cached) = cache.get(host) {
            return *cached;
        }
        let result = self.trie.find_longest(StrView::new(host).reverse()).copied();
        cache.put(host.to_owned(), result);
        result
    }
}

// =============================================================================
// UrlMatcher
// =============================================================================

/// The tracking protection decision engine.
///
/// One matcher instance is shared by any number of page sessions via `Arc`;
/// per-navigation context stays in each session's adapter
/// ([`crate::session::TrackingSession`]). All methods take `&self`.
pub struct UrlMatcher {
    rules: ArcSwap<RuleSet>,
    whitelist: ArcSwap<EntityWhitelist>,
    disabled_categories: ArcSwap<HashSet<String>>,
    options: MatcherOptions,
}

impl Default for UrlMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlMatcher {
    /// Create a matcher with no patterns loaded and default options.
    pub fn new() -> Self {
        Self::with_options(MatcherOptions::default())
    }

    pub fn with_options(options: MatcherOptions) -> Self {
        Self {
            rules: ArcSwap::from_pointee(RuleSet::empty()),
            whitelist: ArcSwap::from_pointee(EntityWhitelist::new()),
            disabled_categories: ArcSwap::from_pointee(HashSet::new()),
            options,
        }
    }

    /// Compile `list` into a fresh rule set and publish it atomically,
    /// replacing the previous one.
    ///
    /// Malformed entries never abort the load: empty patterns and patterns
    /// already claimed by an earlier entry are skipped with a warning and
    /// counted in the returned report.
    pub fn load_patterns(&self, list: BlockList) -> LoadReport {
        let mut trie = Trie::new();
        let mut entities = Vec::with_capacity(list.entities.len());
        let mut seen: HashSet<String> = HashSet::new();
        let mut patterns = 0usize;
        let mut skipped = 0usize;

        for entity in list.entities {
            let id = entities.len() as EntityId;
            let mut kept = Vec::with_capacity(entity.patterns.len());
            for pattern in &entity.patterns {
                let pattern = pattern.trim().to_ascii_lowercase();
                if pattern.is_empty() {
                    warn!("skipping empty pattern in entity '{}'", entity.name);
                    skipped += 1;
                    continue;
                }
                if !seen.insert(pattern.clone()) {
                    warn!(
                        "skipping duplicate pattern '{}' in entity '{}'",
                        pattern, entity.name
                    );
                    skipped += 1;
                    continue;
                }
                trie.put(StrView::new(&pattern).reverse(), id);
                kept.push(pattern);
                patterns += 1;
            }
            entities.push(Arc::new(Entity {
                name: entity.name,
                category: entity.category,
                patterns: kept,
            }));
        }

        let report = LoadReport {
            entities: entities.len(),
            patterns,
            skipped,
        };
        debug!(
            "publishing rule set '{}': {} entities, {} patterns, {} skipped",
            list.source, report.entities, report.patterns, report.skipped
        );
        self.rules.store(Arc::new(RuleSet::build(entities, trie)));
        report
    }

    /// Replace the entity whitelist (related-company domains that don't
    /// count as third parties for each other's sites).
    pub fn load_entity_whitelist(&self, whitelist: EntityWhitelist) {
        self.whitelist.store(Arc::new(whitelist));
    }

    /// Enable or disable a category at runtime. Cheap: replaces a small set
    /// behind an atomic pointer, no rebuild, no cache invalidation.
    pub fn set_category_enabled(&self, category: &str, enabled: bool) {
        let current = self.disabled_categories.load();
        if current.contains(category) != enabled {
            // Already in the requested state.
            return;
        }
        let mut next: HashSet<String> = (**current).clone();
        if enabled {
            next.remove(category);
        } else {
            next.insert(category.to_owned());
        }
        self.disabled_categories.store(Arc::new(next));
    }

    pub fn is_category_enabled(&self, category: &str) -> bool {
        !self.disabled_categories.load().contains(category)
    }

    /// Decide block/allow for a single request.
    ///
    /// `page_url` is the current first-party context as last reported by the
    /// session adapter; `None` means no navigation context has been seen
    /// yet, in which case the matcher fails open rather than blanking out a
    /// page it cannot classify.
    pub fn should_intercept(
        &self,
        request_url: &str,
        is_main_frame: bool,
        page_url: Option<&str>,
    ) -> MatchVerdict {
        // The user asked for this URL; never second-guess a top-level
        // navigation, even to a listed host.
        if is_main_frame {
            return MatchVerdict::allow(MatchReason::MainFrameException);
        }

        let page_url = match page_url {
            Some(url) => url,
            None => {
                warn!("request before any navigation context, allowing: {request_url}");
                return MatchVerdict::allow(MatchReason::NoMatch);
            }
        };

        let request_host = match extract_host(request_url) {
            Some(host) => host,
            None => return MatchVerdict::allow(MatchReason::NoMatch),
        };

        // First-party exception: resources a page loads from its own host
        // are never blocked, favicons included. A data: page has no host,
        // so nothing is first-party to it and matching still applies.
        if let Some(page_host) = extract_host(page_url) {
            if request_host.eq_ignore_ascii_case(page_host) {
                return MatchVerdict::allow(MatchReason::FirstPartyException);
            }
        }

        // Only web resources are subject to blocking.
        match extract_scheme(request_url) {
            Some(scheme) if scheme.intersects(SchemeMask::WEB) => {}
            _ => return MatchVerdict::allow(MatchReason::NoMatch),
        }

        // Hosts belonging to the page's own corporate entity are treated
        // as first-party even though they differ from the page host.
        if self.whitelist.load().is_whitelisted(request_url, page_url) {
            return MatchVerdict::allow(MatchReason::FirstPartyException);
        }

        let path = extract_path(request_url);
        if path.ends_with("/favicon.ico") {
            // Third-party favicon fetches are blocked outright, list or no
            // list. Inherited product rule; carries no entity.
            return MatchVerdict::block(None);
        }
        if self.options.block_webfonts && is_webfont(path) {
            return MatchVerdict::block(None);
        }

        // Trie patterns are stored lowercased; normalize only when the
        // request host actually needs it.
        let host: Cow<'_, str> = if request_host.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(request_host.to_ascii_lowercase())
        } else {
            Cow::Borrowed(request_host)
        };

        let rules = self.rules.load();
        match rules.lookup(&host) {
            Some(id) => {
                let entity = &rules.entities[id as usize];
                if self.disabled_categories.load().contains(&entity.category) {
                    MatchVerdict::allow(MatchReason::NoMatch)
                } else {
                    MatchVerdict::block(Some(Arc::clone(entity)))
                }
            }
            None => MatchVerdict::allow(MatchReason::NoMatch),
        }
    }

    /// Convenience entry point: does loading `resource_url` from the page at
    /// `page_url` get blocked? Sub-resource context assumed.
    pub fn matches(&self, resource_url: &str, page_url: &str) -> bool {
        self.should_intercept(resource_url, false, Some(page_url)).blocked
    }
}

fn is_webfont(path: &str) -> bool {
    WEBFONT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
