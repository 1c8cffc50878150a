//! Blocklist format parsing
//!
//! The native and Disconnect-style formats produce the same in-memory
//! [`BlockList`]; the entity list format produces an [`EntityWhitelist`].
//! Malformed entries inside an otherwise valid document are skipped, never
//! fatal; the matcher's loader applies the same policy one layer down.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use shield_core::whitelist::{EntityWhitelist, HostSet};
use shield_core::{BlockList, Entity, StrView};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid blocklist JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("blocklist contains no entities")]
    Empty,
}

// =============================================================================
// Native format
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawBlockList {
    #[serde(default)]
    source: String,
    entities: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    name: String,
    category: String,
    patterns: Vec<String>,
}

/// Parse the native entity format:
///
/// ```json
/// {
///   "source": "bundled-2024-06",
///   "entities": [
///     { "name": "AdCo", "category": "Advertising", "patterns": ["adco.example"] }
///   ]
/// }
/// ```
pub fn parse_block_list(text: &str) -> Result<BlockList, ParseError> {
    let raw: RawBlockList = serde_json::from_str(text)?;
    if raw.entities.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(BlockList {
        source: raw.source,
        entities: raw
            .entities
            .into_iter()
            .map(|entity| Entity {
                name: entity.name,
                category: entity.category,
                patterns: entity.patterns,
            })
            .collect(),
    })
}

// =============================================================================
// Disconnect format
// =============================================================================

#[derive(Debug, Deserialize)]
struct DisconnectList {
    categories: BTreeMap<String, Vec<BTreeMap<String, Value>>>,
}

/// Parse a Disconnect-style list:
///
/// ```json
/// {
///   "categories": {
///     "Advertising": [
///       { "AdCo": { "http://adco.example/": ["adco.example", "ads.example"] } }
///     ]
///   }
/// }
/// ```
///
/// Each entity maps its homepage URL to the domains it serves from. Values
/// of any other shape (metadata keys some upstream lists mix in) are
/// skipped with a warning.
pub fn parse_disconnect_list(source: &str, text: &str) -> Result<BlockList, ParseError> {
    let raw: DisconnectList = serde_json::from_str(text)?;
    let mut entities = Vec::new();

    for (category, members) in raw.categories {
        for member in members {
            for (name, properties) in member {
                let mut patterns = Vec::new();
                let map = match properties {
                    Value::Object(map) => map,
                    other => {
                        warn!(
                            "skipping entity '{name}' in category '{category}': \
                             expected an object, got {other}"
                        );
                        continue;
                    }
                };
                for (property, resources) in map {
                    match resources {
                        Value::Array(domains) => {
                            for domain in domains {
                                match domain {
                                    Value::String(domain) => patterns.push(domain),
                                    other => warn!(
                                        "skipping non-string domain {other} under \
                                         '{property}' of entity '{name}'"
                                    ),
                                }
                            }
                        }
                        // Metadata keys like "performance": "true"
                        _ => warn!("skipping metadata key '{property}' of entity '{name}'"),
                    }
                }
                if patterns.is_empty() {
                    warn!("entity '{name}' in category '{category}' has no domains");
                    continue;
                }
                entities.push(Entity {
                    name,
                    category: category.clone(),
                    patterns,
                });
            }
        }
    }

    if entities.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(BlockList {
        source: source.to_owned(),
        entities,
    })
}

// =============================================================================
// Entity list format
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawWhitelistEntry {
    #[serde(default)]
    properties: Vec<String>,
    #[serde(default)]
    resources: Vec<String>,
}

/// Parse an entity list mapping company names to the sites they operate
/// ("properties") and the hosts they serve content from ("resources"):
///
/// ```json
/// {
///   "MozCo": { "properties": ["mozilla.org"], "resources": ["mozcdn.net"] }
/// }
/// ```
///
/// Entities missing either side are skipped with a warning.
pub fn parse_entity_list(text: &str) -> Result<EntityWhitelist, ParseError> {
    let raw: BTreeMap<String, RawWhitelistEntry> = serde_json::from_str(text)?;
    let mut whitelist = EntityWhitelist::new();
    let mut usable = 0usize;

    for (name, entry) in raw {
        if entry.properties.is_empty() || entry.resources.is_empty() {
            warn!("skipping entity '{name}': needs both properties and resources");
            continue;
        }
        let mut resources = HostSet::new();
        for resource in &entry.resources {
            let resource = resource.trim().to_ascii_lowercase();
            if resource.is_empty() {
                warn!("skipping empty resource host of entity '{name}'");
                continue;
            }
            resources.put(StrView::new(&resource).reverse(), ());
        }
        let resources = Arc::new(resources);
        for property in &entry.properties {
            let property = property.trim().to_ascii_lowercase();
            if property.is_empty() {
                warn!("skipping empty property host of entity '{name}'");
                continue;
            }
            whitelist.put_whitelist(StrView::new(&property).reverse(), Arc::clone(&resources));
            usable += 1;
        }
    }

    if usable == 0 {
        return Err(ParseError::Empty);
    }
    Ok(whitelist)
}
