//! Collect a user's liked tracks into the persisted link table.

use crate::chrome::{self, ChromeSession};
use crate::progress::{Console, StopReason};
use crate::scrape::{self, ScrollOptions};
use crate::store::{self, LinkRecord};
use crate::types;
use crate::Config;
use std::time::Duration;

pub fn run(config: &Config) -> types::UnitResult {
    let username = config
        .username
        .as_ref()
        .ok_or("Username not specified. See 'help'")?;
    let url = chrome::likes_url(username)?;

    let csv_path = config.csv_path.clone().unwrap();
    let (existing, prior_fault) = match store::load(&csv_path) {
        Ok(existing) => {
            if !existing.is_empty() {
                println!(
                    "Found {} ({} links). New links will be merged in.",
                    csv_path.display(),
                    existing.len()
                );
            }
            (existing, false)
        }
        Err(fault) => {
            println!(
                "Warning: {}. Prior data will be discarded on save!",
                fault
            );
            (Vec::new(), true)
        }
    };

    println!("Starting Chrome...");
    let session = ChromeSession::launch()?;
    // The session owns the browser: it is terminated when this function
    // returns, on success and on every error path.

    let options = ScrollOptions {
        wait: Duration::from_secs_f64(config.scroll_wait),
        stability_threshold: config.stability_checks,
        max_items: config.max_tracks,
        ..ScrollOptions::default()
    };
    let mut observer = Console {
        verbose: config.verbose,
    };

    let collected = scrape::collect(&session, &url, &options, &mut observer)
        .map_err(|e| format!("Page load failed: {}", e))?;

    if let StopReason::AutomationFault(fault) = &collected.stop {
        println!("Collection stopped early: {}. Keeping partial results.", fault);
    }
    if collected.items.is_empty() {
        println!("No likes found for '{}'", username);
        return Ok(());
    }

    let fresh: Vec<LinkRecord> = collected
        .items
        .iter()
        .map(|(title, link)| LinkRecord::new(title, link))
        .collect();
    let (merged, added) = store::merge(&existing, &fresh);

    store::save(&csv_path, &merged)?;
    if prior_fault {
        println!(
            "Rewrote {} from scratch: {} links",
            csv_path.display(),
            merged.len()
        );
    } else {
        println!(
            "Saved {}: {} links ({} new)",
            csv_path.display(),
            merged.len(),
            added
        );
    }

    Ok(())
}
