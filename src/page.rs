//! Page-automation seam used by the scroll collector.
//!
//! The collector only needs a handful of primitives: navigate, measure the
//! document height, scroll to the bottom, and query elements by CSS
//! selector. Keeping them behind a trait lets tests drive the collector
//! with a scripted page instead of a browser.

use std::error::Error;
use std::fmt;

/// Automation failures, split by whether the page handle is still usable.
#[derive(Clone, Debug, PartialEq)]
pub enum PageError {
    /// The browser is gone (crashed, disconnected); no further calls can
    /// succeed. Aborts the scroll loop, keeping whatever was collected.
    Fatal(String),
    /// One lookup failed (timeout, detached node); the loop may continue.
    Transient(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Fatal(e) => write!(f, "fatal automation error: {}", e),
            Self::Transient(e) => write!(f, "transient automation error: {}", e),
        }
    }
}

impl Error for PageError {}

pub trait PageElement {
    fn attribute(&self, name: &str) -> Option<String>;
    /// Text of the inner label element carrying the display title, if any.
    fn label(&self) -> Option<String>;
    /// The element's own text content.
    fn text(&self) -> Option<String>;
}

pub trait Page {
    type Element: PageElement;

    fn navigate(&self, url: &str) -> Result<(), PageError>;
    fn height(&self) -> Result<i64, PageError>;
    fn scroll_to_bottom(&self) -> Result<(), PageError>;
    fn query(&self, selector: &str) -> Result<Vec<Self::Element>, PageError>;
}
