//! Latest-wins tracking for long-running operations.
//!
//! Each session holds at most one visible operation. Starting a new one
//! supersedes the previous; a superseded operation's result is dropped when
//! it arrives instead of overwriting newer state.
//!
//! Sessions are client-chosen, so the board is bounded: slots expire after a
//! TTL and the oldest are evicted once capacity is reached.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::types::{OperationState, ScanReport};

/// Issues monotonically increasing sequence numbers.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number. Never returns the same value twice.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Handle returned when an operation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub session: String,
    pub seq: u64,
}

/// How long a slot survives after it was last written.
pub const DEFAULT_SLOT_TTL: Duration = Duration::from_secs(30 * 60);

/// Maximum number of sessions tracked at once.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Slot<T> {
    seq: u64,
    state: OperationState<T>,
    touched: Instant,
}

/// Per-session operation state with latest-wins semantics.
#[derive(Debug)]
pub struct OperationBoard<T> {
    sequencer: RequestSequencer,
    slots: DashMap<String, Slot<T>>,
    ttl: Duration,
    capacity: usize,
}

impl<T> Default for OperationBoard<T> {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SLOT_TTL, DEFAULT_CAPACITY)
    }
}

impl<T> OperationBoard<T> {
    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            sequencer: RequestSequencer::new(),
            slots: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop expired slots, then evict the oldest operations until there is
    /// room for `incoming`.
    fn prune(&self, incoming: &str, now: Instant) {
        let ttl = self.ttl;
        self.slots.retain(|_, slot| now.duration_since(slot.touched) < ttl);

        if self.slots.contains_key(incoming) || self.slots.len() < self.capacity {
            return;
        }

        let mut by_age: Vec<(u64, String)> = self
            .slots
            .iter()
            .map(|entry| (entry.seq, entry.key().clone()))
            .collect();
        by_age.sort_unstable();

        let excess = self.slots.len() + 1 - self.capacity;
        for (seq, session) in by_age.into_iter().take(excess) {
            debug!("Evicting operation #{} for session {}", seq, session);
            self.slots.remove(&session);
        }
    }
}

/// Board for market scans.
pub type ScanBoard = OperationBoard<ScanReport>;

impl<T: Clone> OperationBoard<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an operation for `session`, superseding any earlier one.
    pub fn begin(&self, session: &str) -> Ticket {
        let now = Instant::now();
        self.prune(session, now);

        let seq = self.sequencer.next();
        self.slots.insert(
            session.to_string(),
            Slot {
                seq,
                state: OperationState::InFlight,
                touched: now,
            },
        );
        Ticket {
            session: session.to_string(),
            seq,
        }
    }

    /// Record the outcome of an operation.
    ///
    /// Returns `false` and leaves the board untouched when a newer operation
    /// has started for the same session since `ticket` was issued.
    pub fn finish(&self, ticket: &Ticket, outcome: Result<T, String>) -> bool {
        let Some(mut slot) = self.slots.get_mut(&ticket.session) else {
            debug!("Dropping result for cleared session {}", ticket.session);
            return false;
        };

        if slot.seq != ticket.seq {
            debug!(
                "Dropping stale result #{} for session {} (latest #{})",
                ticket.seq, ticket.session, slot.seq
            );
            return false;
        }

        slot.state = match outcome {
            Ok(value) => OperationState::Complete(value),
            Err(message) => OperationState::Failed(message),
        };
        slot.touched = Instant::now();
        true
    }

    /// Whether `ticket` is still the latest for its session.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.slots
            .get(&ticket.session)
            .map(|slot| slot.seq == ticket.seq)
            .unwrap_or(false)
    }

    /// Current state for a session.
    pub fn get(&self, session: &str) -> Option<OperationState<T>> {
        self.slots.get(session).map(|slot| slot.state.clone())
    }

    pub fn clear(&self, session: &str) {
        self.slots.remove(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_is_monotonic() {
        let seq = RequestSequencer::new();
        let a = seq.next();
        let b = seq.next();
        assert!(b > a);
    }

    #[test]
    fn test_begin_then_finish() {
        let board: OperationBoard<u32> = OperationBoard::new();
        let ticket = board.begin("s1");
        assert_eq!(board.get("s1"), Some(OperationState::InFlight));

        assert!(board.finish(&ticket, Ok(7)));
        assert_eq!(board.get("s1"), Some(OperationState::Complete(7)));
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let board: OperationBoard<&'static str> = OperationBoard::new();
        let first = board.begin("s1");
        let second = board.begin("s1");

        assert!(board.finish(&second, Ok("second")));
        assert!(!board.finish(&first, Ok("first")));
        assert_eq!(board.get("s1"), Some(OperationState::Complete("second")));
    }

    #[test]
    fn test_stale_result_does_not_clobber_in_flight() {
        let board: OperationBoard<u32> = OperationBoard::new();
        let first = board.begin("s1");
        let second = board.begin("s1");

        assert!(!board.finish(&first, Err("boom".to_string())));
        assert_eq!(board.get("s1"), Some(OperationState::InFlight));
        assert!(board.is_current(&second));
        assert!(!board.is_current(&first));
    }

    #[test]
    fn test_sessions_are_independent() {
        let board: OperationBoard<u32> = OperationBoard::new();
        let a = board.begin("a");
        let _b = board.begin("b");

        assert!(board.finish(&a, Ok(1)));
        assert_eq!(board.get("a"), Some(OperationState::Complete(1)));
        assert_eq!(board.get("b"), Some(OperationState::InFlight));
    }

    #[test]
    fn test_expired_slots_are_pruned() {
        let board: OperationBoard<u32> = OperationBoard::with_limits(Duration::ZERO, 16);
        let old = board.begin("old");
        assert!(board.finish(&old, Ok(1)));

        board.begin("new");
        assert_eq!(board.get("old"), None);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let board: OperationBoard<u32> = OperationBoard::with_limits(DEFAULT_SLOT_TTL, 3);
        let tickets: Vec<Ticket> = (0..10).map(|i| board.begin(&format!("s{}", i))).collect();

        assert_eq!(board.len(), 3);
        assert_eq!(board.get("s0"), None);
        assert_eq!(board.get("s9"), Some(OperationState::InFlight));
        assert!(!board.finish(&tickets[0], Ok(0)));
        assert!(board.finish(&tickets[7], Ok(7)));
    }

    #[test]
    fn test_restarting_a_session_at_capacity_keeps_others() {
        let board: OperationBoard<u32> = OperationBoard::with_limits(DEFAULT_SLOT_TTL, 2);
        board.begin("a");
        board.begin("b");
        board.begin("a");

        assert_eq!(board.len(), 2);
        assert!(board.get("b").is_some());
    }

    #[test]
    fn test_distinct_sessions_stay_bounded() {
        let board: OperationBoard<u32> = OperationBoard::new();
        for i in 0..5_000 {
            let ticket = board.begin(&format!("session-{}", i));
            board.finish(&ticket, Ok(i));
        }
        assert_eq!(board.len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_cleared_session_drops_result() {
        let board: OperationBoard<u32> = OperationBoard::new();
        let ticket = board.begin("s1");
        board.clear("s1");
        assert!(!board.finish(&ticket, Ok(1)));
        assert_eq!(board.get("s1"), None);
    }
}
