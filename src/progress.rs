//! Typed progress reporting for long-running phases.
//!
//! The scroll collector and the fetch orchestrator only talk to an
//! [`Observer`]; they never print or touch shared state themselves.

use std::fmt;

/// Why a collection or fetch run stopped.
#[derive(Clone, Debug, PartialEq)]
pub enum StopReason {
    EndOfContent,
    LimitReached,
    AutomationFault(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EndOfContent => write!(f, "end of content reached"),
            Self::LimitReached => write!(f, "track limit reached"),
            Self::AutomationFault(e) => write!(f, "browser fault: {}", e),
        }
    }
}

/// Final state of a run, delivered once through [`ProgressEvent::Terminal`].
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub reason: StopReason,
    pub found: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// A coarse status line, e.g. "Scroll #4. Found: 120".
    Status(String),
    /// Updated count of collected/processed items.
    Progress(usize),
    /// A fine-grained note, e.g. an end-of-page stability check.
    Caption(String),
    /// The run finished; no further events follow.
    Terminal(Outcome),
}

pub trait Observer {
    fn notify(&mut self, event: ProgressEvent);
}

/// Observer that prints to stdout. Captions are only shown in verbose mode.
pub struct Console {
    pub verbose: bool,
}

impl Observer for Console {
    fn notify(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Status(msg) => println!("{}", msg),
            ProgressEvent::Progress(count) => {
                if self.verbose {
                    println!("  {} so far", count);
                }
            }
            ProgressEvent::Caption(msg) => {
                if self.verbose {
                    println!("  {}", msg);
                }
            }
            ProgressEvent::Terminal(outcome) => {
                println!("Done: {} ({} found)", outcome.reason, outcome.found);
            }
        }
    }
}

/// Observer that discards everything. Useful for tests and quiet phases.
pub struct Silent;

impl Observer for Silent {
    fn notify(&mut self, _event: ProgressEvent) {}
}
