use std::collections::BTreeMap;

use scriptview_session::Session;

use crate::loader::LoadedBatch;

/// Submission order of a batch. Assigned when the batch is delivered, not
/// when it finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchSeq(u64);

impl BatchSeq {
    pub fn first() -> Self {
        BatchSeq(0)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        BatchSeq(self.0 + 1)
    }
}

/// Single-writer merge point between concurrent loads and the session.
///
/// Batches may complete in any order; [`MergeQueue::drain_into`] applies them
/// strictly in ticket order and holds back any batch whose predecessors are
/// still loading.
#[derive(Debug, Default)]
pub struct MergeQueue {
    next_ticket: u64,
    next_apply: u64,
    ready: BTreeMap<BatchSeq, LoadedBatch>,
}

impl MergeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next position in the merge order.
    pub fn next_ticket(&mut self) -> BatchSeq {
        let seq = BatchSeq(self.next_ticket);
        self.next_ticket += 1;
        seq
    }

    /// Hand over a loaded batch. Batches for tickets that were never issued
    /// or were already applied are ignored.
    pub fn complete(&mut self, batch: LoadedBatch) {
        let seq = batch.seq;
        if seq.get() < self.next_apply || seq.get() >= self.next_ticket {
            tracing::warn!(batch = seq.get(), "ignoring batch outside the merge window");
            return;
        }
        self.ready.insert(seq, batch);
    }

    /// Apply every batch that is next in line, in order.
    pub fn drain_into(&mut self, session: Session) -> Session {
        let mut session = session;
        let mut cursor = BatchSeq(self.next_apply);
        while let Some(batch) = self.ready.remove(&cursor) {
            tracing::debug!(batch = cursor.get(), "applying batch");
            session = batch.apply(session);
            cursor = cursor.next();
        }
        self.next_apply = cursor.get();
        session
    }

    /// Tickets issued but not yet applied.
    pub fn pending(&self) -> usize {
        (self.next_ticket - self.next_apply) as usize
    }
}
