//! TrackShield CLI
//!
//! Developer tool for inspecting blocklists and replaying URL decisions
//! against them.

use std::collections::BTreeMap;
use std::fs;

use clap::{Parser, Subcommand};

use shield_core::{BlockList, MatchReason, UrlMatcher};
use shield_lists::{parse_block_list, parse_disconnect_list, parse_entity_list};

#[derive(Parser)]
#[command(name = "shield-cli")]
#[command(about = "TrackShield blocklist tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide block/allow for URLs against a blocklist
    Check {
        /// Blocklist JSON file
        #[arg(short, long)]
        list: String,

        /// Parse the list as Disconnect-format JSON
        #[arg(long)]
        disconnect: bool,

        /// Entity list JSON file (related-company whitelist)
        #[arg(long)]
        entities: Option<String>,

        /// Page URL providing the first-party context
        #[arg(short, long)]
        page: String,

        /// Treat the URLs as top-level navigations
        #[arg(long)]
        main_frame: bool,

        /// Categories to disable before matching
        #[arg(long = "disable-category")]
        disabled_categories: Vec<String>,

        /// Request URLs to decide
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Load a blocklist and dump its stats
    Info {
        /// Blocklist JSON file
        #[arg(short, long)]
        list: String,

        /// Parse the list as Disconnect-format JSON
        #[arg(long)]
        disconnect: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            list,
            disconnect,
            entities,
            page,
            main_frame,
            disabled_categories,
            urls,
        } => cmd_check(
            &list,
            disconnect,
            entities.as_deref(),
            &page,
            main_frame,
            &disabled_categories,
            &urls,
        ),
        Commands::Info { list, disconnect } => cmd_info(&list, disconnect),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_list(path: &str, disconnect: bool) -> Result<BlockList, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{path}': {e}"))?;
    let list = if disconnect {
        parse_disconnect_list(path, &content)
    } else {
        parse_block_list(&content)
    };
    list.map_err(|e| format!("Failed to parse '{path}': {e}"))
}

fn cmd_check(
    list: &str,
    disconnect: bool,
    entities: Option<&str>,
    page: &str,
    main_frame: bool,
    disabled_categories: &[String],
    urls: &[String],
) -> Result<(), String> {
    let list = load_list(list, disconnect)?;
    let matcher = UrlMatcher::new();
    matcher.load_patterns(list);
    if let Some(path) = entities {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read '{path}': {e}"))?;
        let whitelist = parse_entity_list(&content)
            .map_err(|e| format!("Failed to parse '{path}': {e}"))?;
        matcher.load_entity_whitelist(whitelist);
    }
    for category in disabled_categories {
        matcher.set_category_enabled(category, false);
    }

    for url in urls {
        let verdict = matcher.should_intercept(url, main_frame, Some(page));
        let decision = if verdict.blocked { "BLOCK" } else { "allow" };
        let reason = match verdict.reason {
            MatchReason::ThirdPartyBlocked => "third-party match",
            MatchReason::MainFrameException => "main frame",
            MatchReason::FirstPartyException => "first party",
            MatchReason::NoMatch => "no match",
        };
        match verdict.matched_entity {
            Some(entity) => {
                println!("{decision}  {url}  ({reason}: {} / {})", entity.name, entity.category)
            }
            None => println!("{decision}  {url}  ({reason})"),
        }
    }

    Ok(())
}

fn cmd_info(list: &str, disconnect: bool) -> Result<(), String> {
    let source = load_list(list, disconnect)?;

    let mut categories: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for entity in &source.entities {
        let slot = categories.entry(entity.category.as_str()).or_default();
        slot.0 += 1;
        slot.1 += entity.patterns.len();
    }

    let matcher = UrlMatcher::new();
    let report = matcher.load_patterns(source.clone());

    println!("Source:   {}", source.source);
    println!("Entities: {}", report.entities);
    println!("Patterns: {} ({} skipped as malformed)", report.patterns, report.skipped);
    println!("Categories:");
    for (category, (entities, patterns)) in categories {
        println!("  {category}: {entities} entities, {patterns} patterns");
    }

    Ok(())
}
