//! Ordering between list fetches and confirmed deletions.
//!
//! Each fetch takes a ticket before its request goes out. When the response
//! arrives:
//!
//! - a ticket older than the last applied one is stale and dropped;
//! - deletions confirmed after the ticket was issued are replayed onto the
//!   result, so a slow fetch cannot bring a deleted item back.
//!
//! A fetch whose request fails hands its ticket back with
//! [`FetchGate::forget`], so removals are only kept while some fetch can
//! still report back.
//!
//! Toggles are not replayed: the server's snapshot wins for `completed`.

use crate::models::Item;
use parking_lot::Mutex;
use tracing::debug;

/// Sequence number handed to a fetch before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct GateState {
    issued: u64,
    applied: u64,
    /// Tickets issued but neither admitted nor forgotten.
    in_flight: usize,
    /// (latest ticket issued at confirmation time, removed id)
    removals: Vec<(u64, String)>,
}

impl GateState {
    /// One outstanding fetch has reported back.
    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.removals.clear();
        }
    }
}

#[derive(Debug, Default)]
pub struct FetchGate {
    state: Mutex<GateState>,
}

impl FetchGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> FetchTicket {
        let mut state = self.state.lock();
        state.issued += 1;
        state.in_flight += 1;
        FetchTicket(state.issued)
    }

    /// Retire a ticket whose fetch never produced a response.
    pub fn forget(&self, ticket: FetchTicket) {
        let mut state = self.state.lock();
        state.settle();
        debug!(ticket = ticket.0, in_flight = state.in_flight, "Fetch ticket retired");
    }

    /// Remember a confirmed deletion while any fetch is still outstanding.
    pub fn record_removal(&self, id: &str) {
        let mut state = self.state.lock();
        if state.in_flight > 0 {
            let issued = state.issued;
            state.removals.push((issued, id.to_string()));
        }
    }

    /// Decide what a fetch response may install.
    ///
    /// Returns `None` when a newer fetch has already been applied.
    pub fn admit(&self, ticket: FetchTicket, mut items: Vec<Item>) -> Option<Vec<Item>> {
        let mut state = self.state.lock();
        if ticket.0 <= state.applied {
            state.settle();
            return None;
        }
        state.applied = ticket.0;

        // Confirmed at or after this ticket: the response may predate them.
        items.retain(|item| {
            !state
                .removals
                .iter()
                .any(|(seen, id)| *seen >= ticket.0 && *id == item.id)
        });
        // Every later ticket was issued after these removals were confirmed.
        state.removals.retain(|(seen, _)| *seen > ticket.0);
        state.settle();

        Some(items)
    }

    /// Number of removals waiting to be replayed.
    pub fn pending_removals(&self) -> usize {
        self.state.lock().removals.len()
    }
}
