use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::IngestConfig;

/// Decides whether a delivered file is handed to the parser at all.
///
/// A file qualifies when its name matches an accepted pattern or its
/// declared content type is an accepted type.
#[derive(Debug, Clone)]
pub struct Eligibility {
    patterns: GlobSet,
    content_types: Vec<String>,
}

impl Eligibility {
    pub fn from_config(config: &IngestConfig) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.accept_patterns {
            let glob =
                Glob::new(pattern).with_context(|| format!("invalid accept pattern: {pattern}"))?;
            builder.add(glob);
        }
        let patterns = builder.build()?;
        let content_types = config
            .accept_content_types
            .iter()
            .map(|t| mime_essence(t).to_ascii_lowercase())
            .collect();
        Ok(Self {
            patterns,
            content_types,
        })
    }

    pub fn accepts(&self, name: &str, content_type: Option<&str>) -> bool {
        self.patterns.is_match(name)
            || content_type.is_some_and(|ct| {
                let essence = mime_essence(ct);
                self.content_types
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(essence))
            })
    }
}

/// `type/subtype` without parameters.
fn mime_essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}
