//! Byte-budgeted batches of events.
//!
//! A [`Batch`] is the in-progress group owned by a single accumulator. Every
//! appended event charges its raw size plus a fixed overhead against the
//! batch's `fill`. Callers consult [`Batch::would_overflow`] before appending
//! and flush the batch if so. An empty batch never overflows, so an event that
//! alone exceeds the budget is still sent, as a batch of one.

use std::mem;

use kdsgen_payload::Event;

#[derive(Debug)]
/// An ordered group of events bound for a single message.
pub struct Batch {
    events: Vec<Event>,
    /// Nominal bytes committed so far, raw sizes plus per-event overhead.
    fill: usize,
    max_payload_bytes: usize,
    overhead_bytes: usize,
}

impl Batch {
    /// Create a new, empty `Batch`.
    #[must_use]
    pub fn new(max_payload_bytes: usize, overhead_bytes: usize) -> Self {
        Self {
            events: Vec::new(),
            fill: 0,
            max_payload_bytes,
            overhead_bytes,
        }
    }

    /// Whether appending an event of `size` bytes would take this batch over
    /// budget. Always false for an empty batch.
    #[must_use]
    pub fn would_overflow(&self, size: usize) -> bool {
        if self.events.is_empty() {
            return false;
        }
        let projected = self
            .fill
            .saturating_add(size)
            .saturating_add(self.overhead_bytes);
        projected > self.max_payload_bytes
    }

    /// Append `event`, charging its size and the overhead to `fill`.
    pub fn push(&mut self, event: Event) {
        self.fill = self
            .fill
            .saturating_add(event.raw.len())
            .saturating_add(self.overhead_bytes);
        self.events.push(event);
    }

    /// Remove and return every event, leaving this batch empty with a fill of
    /// zero.
    pub fn take(&mut self) -> Vec<Event> {
        self.fill = 0;
        mem::take(&mut self.events)
    }

    /// Nominal bytes committed so far.
    #[must_use]
    pub fn fill(&self) -> usize {
        self.fill
    }

    /// The number of events in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether this batch holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod test {
    use kdsgen_payload::Event;
    use proptest::{collection, prelude::*};

    use super::Batch;

    const CAP: usize = 25_000;
    const OVERHEAD: usize = 200;

    fn event(size: usize) -> Event {
        Event::with_raw(String::new(), vec![b'a'; size])
    }

    /// Drive `sizes` through a batch the way an accumulator does, returning the
    /// sizes of the events in every flushed batch.
    fn flushes(sizes: &[usize]) -> Vec<Vec<usize>> {
        let mut batch = Batch::new(CAP, OVERHEAD);
        let mut sent = Vec::new();
        for &size in sizes {
            if batch.would_overflow(size) {
                sent.push(batch.take().iter().map(|e| e.raw.len()).collect());
            }
            batch.push(event(size));
        }
        if !batch.is_empty() {
            sent.push(batch.take().iter().map(|e| e.raw.len()).collect());
        }
        sent
    }

    #[test]
    fn empty_batch_never_overflows() {
        let batch = Batch::new(CAP, OVERHEAD);
        assert!(!batch.would_overflow(usize::MAX));
    }

    #[test]
    fn fill_is_cumulative() {
        let mut batch = Batch::new(CAP, OVERHEAD);
        batch.push(event(1_000));
        assert_eq!(batch.fill(), 1_200);
        batch.push(event(2_000));
        assert_eq!(batch.fill(), 3_400);
        assert_eq!(batch.len(), 2);

        let events = batch.take();
        assert_eq!(events.len(), 2);
        assert_eq!(batch.fill(), 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn exact_fit_does_not_overflow() {
        let mut batch = Batch::new(CAP, OVERHEAD);
        batch.push(event(12_300));
        assert!(!batch.would_overflow(12_300));
        assert!(batch.would_overflow(12_301));
    }

    #[test]
    fn oversized_singleton_is_sent_alone() {
        assert_eq!(flushes(&[30_000]), vec![vec![30_000]]);
    }

    #[test]
    fn oversized_event_flushes_predecessor() {
        assert_eq!(flushes(&[100, 30_000, 100]), vec![
            vec![100],
            vec![30_000],
            vec![100]
        ]);
    }

    #[test]
    fn second_event_over_budget_starts_new_batch() {
        assert_eq!(flushes(&[20_000, 10_000]), vec![vec![20_000], vec![10_000]]);
    }

    #[test]
    fn no_sizes_no_flushes() {
        assert!(flushes(&[]).is_empty());
    }

    // Every flushed batch is within budget unless it is a single event that
    // alone exceeds the budget.
    proptest! {
        #[test]
        fn flushed_batches_within_budget(sizes in collection::vec(0..40_000usize, 0..64)) {
            for batch in flushes(&sizes) {
                prop_assert!(!batch.is_empty());
                let nominal: usize = batch.iter().map(|s| s + OVERHEAD).sum();
                prop_assert!(nominal <= CAP || batch.len() == 1);
            }
        }
    }

    // Every event appended is flushed exactly once, in order.
    proptest! {
        #[test]
        fn flushed_events_conserved(sizes in collection::vec(0..40_000usize, 0..64)) {
            let flattened: Vec<usize> = flushes(&sizes).into_iter().flatten().collect();
            prop_assert_eq!(flattened, sizes);
        }
    }
}
