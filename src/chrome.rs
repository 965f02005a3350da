//! Headless Chrome implementation of the page-automation seam.

use crate::page::{Page, PageElement, PageError};
use crate::types;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;

/// An owned browser + tab pair. The Chrome process is terminated when the
/// session is dropped, so holding the session in the calling scope gives
/// release-on-every-exit-path for free.
pub struct ChromeSession {
    // Kept alive for the lifetime of the tab; dropping it kills Chrome.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub fn launch() -> Result<ChromeSession, Box<dyn std::error::Error>> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()?;
        let browser = Browser::new(options)?;
        let tab = browser.new_tab()?;
        Ok(ChromeSession {
            _browser: browser,
            tab,
        })
    }
}

/// Element data extracted eagerly, so the collector never holds borrows
/// into the DOM across scroll iterations.
pub struct ChromeElement {
    href: Option<String>,
    label: Option<String>,
    text: Option<String>,
}

impl PageElement for ChromeElement {
    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "href" => self.href.clone(),
            _ => None,
        }
    }

    fn label(&self) -> Option<String> {
        self.label.clone()
    }

    fn text(&self) -> Option<String> {
        self.text.clone()
    }
}

/// A dead websocket means the browser is gone; everything else is a lookup
/// problem local to one scan.
fn classify_error(e: impl std::fmt::Display) -> PageError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("connection") || lower.contains("channel") || lower.contains("closed") {
        PageError::Fatal(msg)
    } else {
        PageError::Transient(msg)
    }
}

impl Page for ChromeSession {
    type Element = ChromeElement;

    fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.tab
            .navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| PageError::Fatal(e.to_string()))?;
        Ok(())
    }

    fn height(&self) -> Result<i64, PageError> {
        let result = self
            .tab
            .evaluate("document.body.scrollHeight", false)
            .map_err(|e| PageError::Fatal(e.to_string()))?;
        result
            .value
            .as_ref()
            .and_then(|v| v.as_f64())
            .map(|h| h as i64)
            .ok_or_else(|| PageError::Fatal(String::from("page height not reported")))
    }

    fn scroll_to_bottom(&self) -> Result<(), PageError> {
        self.tab
            .evaluate("window.scrollTo(0, document.body.scrollHeight)", false)
            .map_err(|e| PageError::Fatal(e.to_string()))?;
        Ok(())
    }

    fn query(&self, selector: &str) -> Result<Vec<ChromeElement>, PageError> {
        let elements = match self.tab.find_elements(selector) {
            Ok(elements) => elements,
            // find_elements errors when the selector matches nothing; to
            // the collector that is an empty scan, not a fault.
            Err(e) if e.to_string().to_lowercase().contains("no element") => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(classify_error(e)),
        };

        let mut extracted = Vec::with_capacity(elements.len());
        for element in elements {
            let href = element
                .get_attributes()
                .ok()
                .flatten()
                .and_then(|attrs| attr_value(&attrs, "href"));
            let label = element
                .find_element("span")
                .ok()
                .and_then(|span| span.get_inner_text().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            let text = element
                .get_inner_text()
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            extracted.push(ChromeElement { href, label, text });
        }
        Ok(extracted)
    }
}

/// `get_attributes` yields a flat `[name, value, name, value, ...]` list.
fn attr_value(attrs: &[String], name: &str) -> Option<String> {
    attrs
        .chunks(2)
        .find(|pair| pair.len() == 2 && pair[0] == name)
        .map(|pair| pair[1].clone())
}

/// Resolve a profile's likes page URL from a bare username.
pub fn likes_url(username: &str) -> types::StringResult {
    let username = username.trim();
    if username.is_empty() {
        return Err("Username may not be empty. See 'help'".into());
    }
    Ok(format!("https://soundcloud.com/{}/likes", username))
}
