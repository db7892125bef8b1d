//! Simulation-time event queue
//!
//! Deferred work (branch sprouting, seed release) is keyed to the simulation
//! clock rather than wall-clock timers, so it pauses with the frame loop and is
//! dropped on reset.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Scheduled<E> {
    at: f64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    // Reversed so the max-heap pops the earliest event, FIFO among equal times
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of events ordered by due time
#[derive(Debug, Clone)]
pub struct Timeline<E> {
    heap: BinaryHeap<Scheduled<E>>,
    next_seq: u64,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `event` to fire once the clock reaches `at`
    pub fn schedule(&mut self, at: f64, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { at, seq, event });
    }

    /// Remove and return the earliest event due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<E> {
        if self.heap.peek()?.at > now {
            return None;
        }
        self.heap.pop().map(|s| s.event)
    }

    /// Time of the earliest pending event
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|s| s.at)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Cancel everything pending
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(3.0, "c");
        timeline.schedule(1.0, "a");
        timeline.schedule(2.0, "b");

        assert_eq!(timeline.next_due(), Some(1.0));
        assert_eq!(timeline.pop_due(10.0), Some("a"));
        assert_eq!(timeline.pop_due(10.0), Some("b"));
        assert_eq!(timeline.pop_due(10.0), Some("c"));
        assert_eq!(timeline.pop_due(10.0), None);
    }

    #[test]
    fn test_holds_future_events() {
        let mut timeline = Timeline::new();
        timeline.schedule(5.0, 1);
        assert_eq!(timeline.pop_due(4.999), None);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.pop_due(5.0), Some(1));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_equal_times_are_fifo() {
        let mut timeline = Timeline::new();
        for i in 0..5 {
            timeline.schedule(1.0, i);
        }
        let order: Vec<i32> = std::iter::from_fn(|| timeline.pop_due(1.0)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_cancels_pending() {
        let mut timeline = Timeline::new();
        timeline.schedule(0.0, ());
        timeline.schedule(1.0, ());
        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.pop_due(f64::MAX), None);
    }
}
