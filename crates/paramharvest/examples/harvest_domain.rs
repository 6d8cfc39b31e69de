//! Example: harvest parameterized URLs for a few domains
//!
//! Run with: cargo run -p paramharvest --example harvest_domain
//!
//! Queries the live Wayback Machine, so results change over time.

use paramharvest::{ArchiveQuery, HarvestResponse, Harvester, RetryPolicy};
use std::time::Duration;

/// Domains to look up
const DOMAINS: &[&str] = &["example.com", "httpbin.org"];

/// Number of URLs printed per domain
const PREVIEW: usize = 5;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("paramharvest=info")
        .init();

    let harvester = Harvester::builder()
        .retry(RetryPolicy::default().attempt_timeout(Duration::from_secs(60)))
        .build();

    let mut failed = 0;

    for (i, domain) in DOMAINS.iter().enumerate() {
        println!("{}. {}", i + 1, domain);

        match harvester.harvest(&ArchiveQuery::new(*domain)).await {
            Ok(mut response) => {
                response.urls.sort();
                print_summary(&response);
            }
            Err(e) => {
                println!("   Error: {}\n", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_summary(response: &HarvestResponse) {
    let stats = &response.stats;
    println!(
        "   {} raw, {} kept ({} duplicates, {} assets, {} without query, {} malformed)",
        stats.total,
        stats.kept,
        stats.duplicates,
        stats.denied_extension,
        stats.no_query,
        stats.malformed
    );

    for url in response.urls.iter().take(PREVIEW) {
        println!("   {}", url);
    }
    if response.urls.len() > PREVIEW {
        println!("   ... {} more", response.urls.len() - PREVIEW);
    }
    println!();
}
