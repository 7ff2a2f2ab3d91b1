use serde::{Deserialize, Serialize};

const DEFAULT_MAX_PARALLEL_READS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Glob patterns matched against the input's display name.
    pub accept_patterns: Vec<String>,
    /// MIME types accepted when the delivery mechanism declares one.
    pub accept_content_types: Vec<String>,
    /// Upper bound on files read and parsed at the same time within a batch.
    pub max_parallel_reads: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            accept_patterns: vec!["*.json".to_string()],
            accept_content_types: vec!["application/json".to_string()],
            max_parallel_reads: DEFAULT_MAX_PARALLEL_READS,
        }
    }
}

impl IngestConfig {
    /// Apply `SCRIPTVIEW_ACCEPT_PATTERNS` (comma separated) and
    /// `SCRIPTVIEW_MAX_PARALLEL_READS` on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(patterns) = std::env::var("SCRIPTVIEW_ACCEPT_PATTERNS")
            .ok()
            .map(|v| split_list(&v))
            .filter(|p| !p.is_empty())
        {
            self.accept_patterns = patterns;
        }

        if let Some(n) = std::env::var("SCRIPTVIEW_MAX_PARALLEL_READS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.max_parallel_reads = n;
        }

        self
    }

    /// Parallelism actually used: never zero.
    pub fn effective_parallelism(&self) -> usize {
        self.max_parallel_reads.max(1)
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
