use scriptview_core::{LoadError, LoadFailure, ScriptDocument};
use scriptview_parse::parse_script_with_stats;
use scriptview_session::Session;

use crate::config::IngestConfig;
use crate::eligibility::Eligibility;
use crate::input::RawInput;
use crate::merge::BatchSeq;

/// Outcome of one delivered batch, in the batch's input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBatch {
    pub seq: BatchSeq,
    pub documents: Vec<ScriptDocument>,
    pub failures: Vec<LoadFailure>,
}

impl LoadedBatch {
    /// Merge into `session`: at most one document append and one failure
    /// append, skipping whichever list is empty.
    pub fn apply(self, session: Session) -> Session {
        let mut session = session;
        if !self.documents.is_empty() {
            session = session.append_documents(self.documents);
        }
        if !self.failures.is_empty() {
            session = session.append_failures(self.failures);
        }
        session
    }

    /// A batch whose loading thread died: every input becomes a read failure.
    pub fn abandoned<I, S>(seq: BatchSeq, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        LoadedBatch {
            seq,
            documents: Vec::new(),
            failures: names
                .into_iter()
                .map(|name| worker_failure(name.as_ref()))
                .collect(),
        }
    }
}

/// Reads, checks and parses delivered files. Holds no session state and may
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct Loader {
    eligibility: Eligibility,
    parallelism: usize,
}

impl Loader {
    pub fn new(config: &IngestConfig) -> anyhow::Result<Self> {
        Ok(Self {
            eligibility: Eligibility::from_config(config)?,
            parallelism: config.effective_parallelism(),
        })
    }

    /// Load every input of a batch. Files are processed concurrently but
    /// results keep input order. Never fails as a whole.
    pub fn load_batch(&self, seq: BatchSeq, inputs: Vec<RawInput>) -> LoadedBatch {
        tracing::info!(batch = seq.get(), files = inputs.len(), "loading batch");

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for result in self.load_all(&inputs) {
            match result {
                Ok(doc) => documents.push(doc),
                Err(failure) => failures.push(failure),
            }
        }

        tracing::info!(
            batch = seq.get(),
            documents = documents.len(),
            failures = failures.len(),
            "batch loaded"
        );
        LoadedBatch {
            seq,
            documents,
            failures,
        }
    }

    /// Load a single input, converting any error into a [`LoadFailure`].
    pub fn load_one(&self, input: &RawInput) -> Result<ScriptDocument, LoadFailure> {
        self.try_load(input).map_err(|err| {
            tracing::warn!(file = %input.name, kind = err.kind().as_str(), "load failed: {err:?}");
            LoadFailure::from_error(&input.name, &err)
        })
    }

    fn try_load(&self, input: &RawInput) -> Result<ScriptDocument, LoadError> {
        if !self
            .eligibility
            .accepts(&input.name, input.content_type.as_deref())
        {
            return Err(LoadError::Ineligible);
        }

        let text = input.read_text()?;
        let (outcome, stats) = parse_script_with_stats(&text);
        let records = outcome?;
        tracing::debug!(
            file = %input.name,
            kept = stats.records_kept,
            dropped = stats.dropped(),
            defaulted = stats.speakers_defaulted,
            "parsed script"
        );
        Ok(ScriptDocument::new(input.name.clone(), records))
    }

    fn load_all(&self, inputs: &[RawInput]) -> Vec<Result<ScriptDocument, LoadFailure>> {
        load_in_chunks(inputs, self.parallelism, |input| self.load_one(input))
    }
}

/// Run `load` over `inputs` on up to `parallelism` scoped threads. Contiguous
/// chunks joined in spawn order keep input order; a panicking chunk becomes
/// read failures.
fn load_in_chunks<F>(
    inputs: &[RawInput],
    parallelism: usize,
    load: F,
) -> Vec<Result<ScriptDocument, LoadFailure>>
where
    F: Fn(&RawInput) -> Result<ScriptDocument, LoadFailure> + Sync,
{
    if inputs.is_empty() {
        return Vec::new();
    }
    let workers = parallelism.clamp(1, inputs.len());
    let chunk_size = inputs.len().div_ceil(workers);
    let load = &load;

    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .chunks(chunk_size)
            .map(|chunk| {
                let handle = scope.spawn(move || chunk.iter().map(load).collect::<Vec<_>>());
                (chunk, handle)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(chunk, handle)| {
                handle.join().unwrap_or_else(|_| {
                    tracing::error!(files = chunk.len(), "loader worker panicked");
                    chunk
                        .iter()
                        .map(|input| Err(worker_failure(&input.name)))
                        .collect()
                })
            })
            .collect()
    })
}

fn worker_failure(name: &str) -> LoadFailure {
    let err = LoadError::Read(std::io::Error::other("loader worker panicked"));
    LoadFailure::from_error(name, &err)
}
