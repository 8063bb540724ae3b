use std::path::{Path, PathBuf};

use async_trait::async_trait;
use swipe_core::{Candidate, CandidateLoader, SwipeError};

use crate::csv_parser::parse_candidates;

/// Loads candidates from a CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvCandidateLoader {
    path: PathBuf,
}

impl CsvCandidateLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CandidateLoader for CsvCandidateLoader {
    async fn load(&self) -> Result<Vec<Candidate>, SwipeError> {
        let data = tokio::fs::read_to_string(&self.path).await?;
        let report = parse_candidates(&data)?;

        tracing::info!(
            "Loaded {} candidates from {} ({} rows skipped)",
            report.candidates.len(),
            self.path.display(),
            report.skipped_rows
        );

        Ok(report.candidates)
    }
}

/// Serves a fixed, already validated candidate list
#[derive(Debug, Clone, Default)]
pub struct StaticCandidateLoader {
    candidates: Vec<Candidate>,
}

impl StaticCandidateLoader {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl CandidateLoader for StaticCandidateLoader {
    async fn load(&self) -> Result<Vec<Candidate>, SwipeError> {
        Ok(self.candidates.clone())
    }
}
