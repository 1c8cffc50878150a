//! Entity whitelist
//!
//! Tracker lists group domains by the company operating them. A page may
//! load resources from hosts belonging to the same company without those
//! requests counting as tracking, so the whitelist maps each entity's site
//! hosts ("properties") to the hosts it serves content from ("resources").
//!
//! Whitelists are keyed by site host and inherited downwards: entries for
//! `mozilla.org` and `foo.mozilla.org` both apply to `foo.mozilla.org`.

use std::sync::Arc;

use crate::strview::StrView;
use crate::trie::Trie;
use crate::url::extract_host;

/// Set of resource hosts allowed for some site.
pub type HostSet = Trie<()>;

/// Site host -> allowed resource hosts.
#[derive(Debug, Default)]
pub struct EntityWhitelist {
    sites: Trie<Arc<HostSet>>,
}

impl EntityWhitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resources` as whitelisted for the site given by `site` (a
    /// reversed host view). Entities with several properties share one
    /// resource set.
    pub fn put_whitelist(&mut self, site: StrView<'_>, resources: Arc<HostSet>) {
        self.sites.put(site, resources);
    }

    /// Is `resource_url` served by a host whitelisted for the page at
    /// `page_url`? Pages without a host (data: documents) whitelist
    /// nothing.
    pub fn is_whitelisted(&self, resource_url: &str, page_url: &str) -> bool {
        let page_host = match extract_host(page_url) {
            Some(host) => host,
            None => return false,
        };
        let resource_host = match extract_host(resource_url) {
            Some(host) => host,
            None => return false,
        };

        let resource = StrView::new(resource_host).reverse();
        // Every whitelist along the page host applies, so check the
        // resource against each until one accepts it.
        self.sites
            .walk_matches(StrView::new(page_host).reverse(), |hosts| {
                hosts.find_node(resource).is_some()
            })
    }
}
