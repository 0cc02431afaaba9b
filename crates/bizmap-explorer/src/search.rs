//! Supersede-by-generation for the debounced search term.
//!
//! Every keystroke schedules a [`SearchTicket`] carrying a fresh generation.
//! Only the ticket matching the latest generation may commit; anything older
//! is stale no matter when its timer fires.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    term: String,
}

impl SearchTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }
}

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    latest: u64,
    delay: Duration,
}

impl SearchDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { latest: 0, delay }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Issue a ticket for `term`, superseding every earlier one.
    pub fn schedule(&mut self, term: impl Into<String>) -> SearchTicket {
        self.latest += 1;
        SearchTicket {
            generation: self.latest,
            term: term.into(),
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.generation == self.latest
    }
}

/// Wait out the debounce delay, then hand the ticket back for committing.
pub async fn debounced(ticket: SearchTicket, delay: Duration) -> SearchTicket {
    tokio::time::sleep(delay).await;
    ticket
}
