//! Latest-request-wins tracking for fetches.
//!
//! Each logical fetch target (a page section, a selection-driven panel) has a
//! monotonically increasing generation. A response may only be applied when
//! its ticket still carries the latest generation issued for its target, so a
//! slow reply to a superseded selection can never overwrite fresher state.

use dashmap::DashMap;
use std::sync::Arc;

/// Proof of which request a response belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    target: String,
    generation: u64,
}

impl FetchTicket {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Generation counters keyed by fetch target. Cloning shares the counters.
#[derive(Debug, Clone, Default)]
pub struct FetchGenerations {
    latest: Arc<DashMap<String, u64>>,
}

impl FetchGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new generation for `target`, superseding all earlier tickets.
    pub fn begin(&self, target: &str) -> FetchTicket {
        let mut entry = self.latest.entry(target.to_string()).or_insert(0);
        *entry += 1;
        let generation = *entry;
        drop(entry);

        log::debug!("[FETCH_GEN] {} -> generation {}", target, generation);
        FetchTicket {
            target: target.to_string(),
            generation,
        }
    }

    /// True if no newer ticket has been issued for the ticket's target
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest
            .get(&ticket.target)
            .map(|latest| *latest == ticket.generation)
            .unwrap_or(false)
    }

    /// Latest issued generation for `target` (0 when none)
    pub fn latest(&self, target: &str) -> u64 {
        self.latest.get(target).map(|g| *g).unwrap_or(0)
    }

    /// Run `apply` only for a current ticket. Returns whether it ran.
    pub fn apply_if_current<F: FnOnce()>(&self, ticket: &FetchTicket, apply: F) -> bool {
        if self.is_current(ticket) {
            apply();
            true
        } else {
            log::warn!(
                "[FETCH_GEN] Discarding stale result for {} (generation {} < {})",
                ticket.target,
                ticket.generation,
                self.latest(&ticket.target)
            );
            false
        }
    }
}
