//! Reversed-host pattern trie
//!
//! Stores patterns one node per byte and answers "does any stored pattern
//! match this host" in O(host length), independent of corpus size. Domain
//! patterns are inserted reversed so that suffix matching becomes a prefix
//! walk. Built once per list load; never mutated afterwards (readers share
//! the finished trie through an atomic swap).
//!
//! The terminal payload is generic: the blocklist trie attaches entity ids,
//! the entity whitelist attaches whole host sets.

use std::collections::HashMap;

use crate::strview::StrView;

/// Index of an entity within its owning rule set.
pub type EntityId = u32;

/// A node in the pattern trie. The root represents the empty prefix.
#[derive(Debug)]
pub struct Trie<T> {
    children: HashMap<u8, Trie<T>>,
    /// Payload of the pattern that ends at this node, if any.
    terminal: Option<T>,
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            terminal: None,
        }
    }
}

impl<T> Trie<T> {
    /// Create an empty root node.
    pub fn new() -> Self {
        Self::default()
    }

    /// The payload attached to this node, when a pattern ends here.
    pub fn value(&self) -> Option<&T> {
        self.terminal.as_ref()
    }

    /// Insert a pattern in matching orientation (callers insert reversed
    /// views for domain suffix matching). The final node records the
    /// payload; re-inserting an existing pattern overwrites it, so
    /// duplicate detection belongs to the loader.
    pub fn put(&mut self, pattern: StrView<'_>, value: T) {
        let mut node = self;
        for i in 0..pattern.len() {
            node = node.children.entry(pattern.char_at(i)).or_default();
        }
        node.terminal = Some(value);
    }

    /// Exact lookup with the subdomain boundary rule: a stored pattern also
    /// matches when it is a proper prefix of `query` and the next query byte
    /// is `.`. With reversed views this makes `bar.foo.com` match a stored
    /// `foo.com`, while `bar-foo.com` and `oo.com` do not.
    ///
    /// Returns the shallowest matching node.
    pub fn find_node(&self, query: StrView<'_>) -> Option<&Trie<T>> {
        let mut node = self;
        let mut i = 0;
        loop {
            if node.terminal.is_some() && (i == query.len() || query.char_at(i) == b'.') {
                return Some(node);
            }
            if i == query.len() {
                return None;
            }
            match node.children.get(&query.char_at(i)) {
                Some(child) => {
                    node = child;
                    i += 1;
                }
                None => return None,
            }
        }
    }

    /// Longest-match lookup: walk as far as the query and the trie allow,
    /// recording every boundary-valid terminal passed, and return the
    /// payload of the deepest one. The most specific stored pattern wins
    /// over a shorter pattern that also matches (`example.com` beats `com`
    /// for `www.example.com`).
    ///
    /// O(min(query length, longest stored pattern)); no backtracking.
    pub fn find_longest(&self, query: StrView<'_>) -> Option<&T> {
        let mut node = self;
        let mut best = None;
        let mut i = 0;
        loop {
            if node.terminal.is_some() && (i == query.len() || query.char_at(i) == b'.') {
                best = node.terminal.as_ref();
            }
            if i == query.len() {
                break;
            }
            match node.children.get(&query.char_at(i)) {
                Some(child) => {
                    node = child;
                    i += 1;
                }
                None => break,
            }
        }
        best
    }

    /// Visit the payload of every boundary-valid pattern along `query`,
    /// shallowest first. Stops as soon as `visit` returns true; the return
    /// value says whether any visit did. Separate whitelists can exist for
    /// a host and its parent domains, and all of them apply.
    pub fn walk_matches<F>(&self, query: StrView<'_>, mut visit: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut node = self;
        let mut i = 0;
        loop {
            if let Some(value) = &node.terminal {
                if (i == query.len() || query.char_at(i) == b'.') && visit(value) {
                    return true;
                }
            }
            if i == query.len() {
                return false;
            }
            match node.children.get(&query.char_at(i)) {
                Some(child) => {
                    node = child;
                    i += 1;
                }
                None => return false,
            }
        }
    }
}
