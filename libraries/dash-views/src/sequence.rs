//! Request sequencing for loads that may overlap.
//!
//! A visible load and a live-refresh fetch can be in flight at the same
//! time. Each takes a [`Ticket`] before it starts; when its response comes
//! back it may only be applied if no newer ticket has been applied already.
//! A failed request applies nothing and leaves the sequence where it was.

use std::sync::atomic::{AtomicU64, Ordering};

/// Position of a request in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket dispenser for one entity (a list, a profile).
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket. Tickets start at 1.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Mark `ticket` as applied if it is newer than every ticket applied so
    /// far. Returns `false` for a stale response, which must be dropped.
    pub fn try_apply(&self, ticket: Ticket) -> bool {
        self.applied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |applied| {
                (ticket.0 > applied).then_some(ticket.0)
            })
            .is_ok()
    }

    /// Whether `ticket`, or a newer one, has already been applied. Does not
    /// advance the sequence.
    pub fn is_superseded(&self, ticket: Ticket) -> bool {
        ticket.0 <= self.applied.load(Ordering::SeqCst)
    }

    /// Newest ticket applied so far, if any.
    pub fn last_applied(&self) -> Option<Ticket> {
        match self.applied.load(Ordering::SeqCst) {
            0 => None,
            n => Some(Ticket(n)),
        }
    }
}
