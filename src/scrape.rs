//! Infinite-scroll collection of liked-track links.
//!
//! Drives a [`Page`] through repeated "scroll, wait, re-scan" cycles until
//! the document height stops growing, a track limit is hit, or the browser
//! dies. There is no readiness signal from the page, so a fixed
//! configurable wait after each scroll is the synchronization mechanism;
//! crude, but the only option the page interface offers.

use crate::page::{Page, PageElement, PageError};
use crate::progress::{Observer, Outcome, ProgressEvent, StopReason};
use std::collections::HashSet;
use std::thread;
use std::time::Duration;

/// Best-effort selectors for track anchors on the likes page. The fallback
/// tolerates minor markup variation; neither is a stability guarantee.
const PRIMARY_SELECTOR: &str = "div.soundList__item div.sound__header a.soundTitle__title";
const FALLBACK_SELECTOR: &str = "li.soundList__item a.soundTitle__title";

pub struct ScrollOptions {
    /// Settle time after the initial navigation.
    pub settle: Duration,
    /// Pause after each scroll, waiting for lazy content.
    pub wait: Duration,
    /// Consecutive unchanged-height checks required to stop.
    pub stability_threshold: u32,
    /// Stop once this many links are collected; 0 means unbounded.
    pub max_items: usize,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        ScrollOptions {
            settle: Duration::from_secs(5),
            wait: Duration::from_secs(2),
            stability_threshold: 3,
            max_items: 0,
        }
    }
}

/// Result of one collection run. A fatal mid-loop fault still yields the
/// links gathered up to that point; only a failed page load is an `Err`.
pub struct Collected {
    /// `(title, link)` pairs in discovery order, deduplicated by link.
    pub items: Vec<(String, String)>,
    pub stop: StopReason,
    pub scrolls: u32,
}

/// Scroll through `url` and accumulate every `(title, link)` pair found.
///
/// Links are deduplicated on first sight: a link seen again with another
/// title keeps the first title. Reconciling titles against previous runs is
/// the store merge's job, which applies last-write-wins on a later boundary.
pub fn collect<P: Page>(
    page: &P,
    url: &str,
    options: &ScrollOptions,
    observer: &mut dyn Observer,
) -> Result<Collected, PageError> {
    observer.notify(ProgressEvent::Status(format!("Loading page: {}", url)));
    page.navigate(url)?;
    thread::sleep(options.settle);

    let limit_info = if options.max_items > 0 {
        format!(" (limit: {})", options.max_items)
    } else {
        String::new()
    };
    observer.notify(ProgressEvent::Status(format!(
        "Collecting likes{}...",
        limit_info
    )));

    let mut items: Vec<(String, String)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut scrolls = 0;
    let mut stable = 0;

    let mut last_height = match page.height() {
        Ok(h) => h,
        Err(e) => return Ok(finish(items, StopReason::AutomationFault(e.to_string()), scrolls, observer)),
    };

    let stop = loop {
        scrolls += 1;
        observer.notify(ProgressEvent::Status(format!(
            "Scroll #{}. Found: {}",
            scrolls,
            items.len()
        )));

        if let Err(e) = page.scroll_to_bottom() {
            break StopReason::AutomationFault(e.to_string());
        }
        thread::sleep(options.wait);

        let elements = match scan(page) {
            Ok(elements) => elements,
            Err(PageError::Transient(e)) => {
                observer.notify(ProgressEvent::Status(format!(
                    "Scan error on scroll #{}: {}. Continuing",
                    scrolls, e
                )));
                thread::sleep(options.wait);
                continue;
            }
            Err(PageError::Fatal(e)) => break StopReason::AutomationFault(e),
        };

        let mut new_found = 0;
        let mut limit_reached = false;
        for element in &elements {
            let link = match element.attribute("href") {
                Some(link) => link,
                None => continue,
            };
            let title = match element.label().or_else(|| element.text()) {
                Some(title) => title,
                None => continue,
            };

            if seen.insert(link.clone()) {
                items.push((title, link));
                new_found += 1;

                // Stop as soon as possible, even mid-scan.
                if options.max_items > 0 && items.len() >= options.max_items {
                    limit_reached = true;
                    break;
                }
            }
        }

        if limit_reached {
            observer.notify(ProgressEvent::Progress(items.len()));
            break StopReason::LimitReached;
        }
        if new_found > 0 {
            observer.notify(ProgressEvent::Progress(items.len()));
        }

        match page.height() {
            Ok(height) if height == last_height => {
                stable += 1;
                observer.notify(ProgressEvent::Caption(format!(
                    "End of page check ({}/{})",
                    stable, options.stability_threshold
                )));
                if stable >= options.stability_threshold {
                    break StopReason::EndOfContent;
                }
            }
            Ok(height) => {
                last_height = height;
                stable = 0;
            }
            Err(e) => break StopReason::AutomationFault(e.to_string()),
        }
    };

    Ok(finish(items, stop, scrolls, observer))
}

/// One element scan: primary selector first, fallback when it yields nothing.
fn scan<P: Page>(page: &P) -> Result<Vec<P::Element>, PageError> {
    let elements = page.query(PRIMARY_SELECTOR)?;
    if elements.is_empty() {
        return page.query(FALLBACK_SELECTOR);
    }
    Ok(elements)
}

fn finish(
    items: Vec<(String, String)>,
    stop: StopReason,
    scrolls: u32,
    observer: &mut dyn Observer,
) -> Collected {
    observer.notify(ProgressEvent::Terminal(Outcome {
        reason: stop.clone(),
        found: items.len(),
    }));
    Collected {
        items,
        stop,
        scrolls,
    }
}
