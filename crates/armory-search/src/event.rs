//! Progress events and sinks.
//!
//! A search reports through one [`ProgressSink`] handed over at invocation
//! time. Sinks run on the search thread and must not block; hand events off
//! to your own dispatch mechanism (for example the provided
//! `UnboundedSender` implementation). Counts in successive events never
//! decrease. The sink is dropped when the search ends.
//!
//! ```
//! use armory_search::{ProgressSink, SearchEvent};
//! use std::time::Duration;
//!
//! let mut lines = Vec::new();
//! let mut sink = |event: &SearchEvent| lines.push(event.to_string());
//! sink.on_event(&SearchEvent::Progress {
//!     explored: 2_000,
//!     matches: 3,
//!     elapsed: Duration::from_millis(40),
//! });
//! drop(sink);
//!
//! assert_eq!(lines[0], "explored 2000 combinations, 3 matches (40ms)");
//! ```

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::request::SearchStatus;

/// Advisory diagnostic emitted while searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Started {
        /// Candidates per loadout part after filtering, in search order.
        candidates: Vec<usize>,
        search_space: u128,
    },
    Progress {
        explored: u64,
        matches: u64,
        elapsed: Duration,
    },
    Finished {
        status: SearchStatus,
        explored: u64,
        matches: u64,
        elapsed: Duration,
    },
}

impl fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchEvent::Started {
                candidates,
                search_space,
            } => {
                let counts: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                write!(
                    f,
                    "searching {search_space} combinations ({})",
                    counts.join(" x ")
                )
            }
            SearchEvent::Progress {
                explored,
                matches,
                elapsed,
            } => write!(
                f,
                "explored {explored} combinations, {matches} matches ({}ms)",
                elapsed.as_millis()
            ),
            SearchEvent::Finished {
                status,
                explored,
                matches,
                elapsed,
            } => write!(
                f,
                "search {}: {explored} combinations, {matches} matches ({}ms)",
                status.as_str().to_ascii_lowercase(),
                elapsed.as_millis()
            ),
        }
    }
}

/// Receives search events on the search thread.
pub trait ProgressSink: Send {
    fn on_event(&mut self, event: &SearchEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&SearchEvent) + Send,
{
    fn on_event(&mut self, event: &SearchEvent) {
        self(event)
    }
}

/// Forwards events to an async receiver. A closed receiver is ignored.
impl ProgressSink for UnboundedSender<SearchEvent> {
    fn on_event(&mut self, event: &SearchEvent) {
        let _ = self.send(event.clone());
    }
}

/// Writes every event as a `debug` log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl ProgressSink for LoggingSink {
    fn on_event(&mut self, event: &SearchEvent) {
        debug!(event = "search_event", text = %event);
    }
}
