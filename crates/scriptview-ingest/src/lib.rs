mod config;
mod eligibility;
mod input;
mod loader;
mod merge;

pub use config::IngestConfig;
pub use eligibility::Eligibility;
pub use input::{InputSource, RawInput};
pub use loader::{LoadedBatch, Loader};
pub use merge::{BatchSeq, MergeQueue};

use scriptview_session::Session;

/// Synchronous front end: load a batch and merge it in one call.
pub struct Ingestor {
    loader: Loader,
    queue: MergeQueue,
}

impl Ingestor {
    pub fn new(config: &IngestConfig) -> anyhow::Result<Self> {
        Ok(Self {
            loader: Loader::new(config)?,
            queue: MergeQueue::new(),
        })
    }

    /// Load `inputs` as one batch and apply it to `session`.
    pub fn ingest(&mut self, session: Session, inputs: Vec<RawInput>) -> Session {
        let seq = self.queue.next_ticket();
        let batch = self.loader.load_batch(seq, inputs);
        self.queue.complete(batch);
        self.queue.drain_into(session)
    }
}
