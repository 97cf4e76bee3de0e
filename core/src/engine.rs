use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::eval::Evaluation;
use crate::token::{Token, parse_token};
use crate::trace::{LoadSummary, TraceIndex, TraceRecord};

/// Outcome of resolving one cursor position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Token under the cursor, if the line yields one.
    pub token: Option<Token>,
    /// Token probed after `token` when the cursor token had no recorded call.
    pub probe: Option<Token>,
    pub evaluations: Vec<Evaluation>,
}

/// Owns the current trace index and answers cursor queries against it.
///
/// Queries work on a snapshot of the index; reseeding swaps in a fully built
/// replacement, so a query never observes a partially loaded trace.
///
/// Every replacement bumps a generation counter. Loads that run in the
/// background reserve a generation with [`Engine::begin_seed`] and install
/// their result with [`Engine::replace_index_if_current`], which refuses once
/// a later load has started.
#[derive(Debug, Default)]
pub struct Engine {
    index: RwLock<Arc<TraceIndex>>,
    generation: AtomicU64,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index with the trace export at `path`. On failure the
    /// previous index stays in place.
    pub fn seed(&self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let path = path.as_ref();
        let (index, summary) = TraceIndex::load(path)?;
        self.replace_index(index);
        info!(
            path = %path.display(),
            rows = summary.rows,
            call_sites = summary.call_sites,
            skipped = summary.skipped,
            "trace export loaded"
        );
        Ok(summary)
    }

    pub fn seed_from_reader<R: Read>(&self, reader: R) -> Result<LoadSummary> {
        let (index, summary) = TraceIndex::from_reader(reader)?;
        self.replace_index(index);
        Ok(summary)
    }

    pub fn replace_index(&self, index: TraceIndex) {
        let mut guard = self.write_index();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *guard = Arc::new(index);
    }

    /// Reserve a generation for a load that will be installed later. Any
    /// replacement started after this call supersedes it.
    pub fn begin_seed(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install `index` if no replacement has started since `generation` was
    /// reserved. Returns whether it was installed.
    pub fn replace_index_if_current(&self, generation: u64, index: TraceIndex) -> bool {
        let mut guard = self.write_index();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *guard = Arc::new(index);
        true
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, Arc<TraceIndex>> {
        match self.index.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> Arc<TraceIndex> {
        match self.index.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Evaluations for the cursor at (`line`, `character`), both 0-based,
    /// where `line_text` is that line of `filepath`.
    pub fn evaluate(&self, filepath: &str, line_text: &str, line: u32, character: usize) -> Vec<Evaluation> {
        self.resolve(filepath, line_text, line, character).evaluations
    }

    /// Like [`Engine::evaluate`], also reporting the tokens that were tried.
    pub fn resolve(&self, filepath: &str, line_text: &str, line: u32, character: usize) -> Resolution {
        let index = self.snapshot();
        let lineno = line.saturating_add(1);
        let lookup = |token: &Token| index.lookup(filepath, lineno, &token.name);

        let Some(token) = parse_token(line_text, character) else {
            debug!(filepath, line, character, "no token at cursor");
            return Resolution::default();
        };

        if let Some(calls) = lookup(&token) {
            let evaluations = calls.into_iter().map(Evaluation::method).collect();
            return Resolution {
                token: Some(token),
                probe: None,
                evaluations,
            };
        }

        // The cursor may rest on a receiver; the call is recorded under the
        // method name that follows it.
        let probe = parse_token(line_text, token.end_index.saturating_add(1));
        let evaluations = probe
            .as_ref()
            .and_then(lookup)
            .map(|calls| calls.into_iter().map(Evaluation::entity).collect())
            .unwrap_or_default();

        Resolution {
            token: Some(token),
            probe,
            evaluations,
        }
    }

    /// Distinct calls recorded at the 0-based `line` of `filepath`, one per
    /// method name in first-seen order.
    pub fn calls_at(&self, filepath: &str, line: u32) -> Vec<TraceRecord> {
        let index = self.snapshot();
        let mut seen: Vec<TraceRecord> = Vec::new();
        for call in index.calls_at(filepath, line.saturating_add(1)) {
            if !seen.iter().any(|s| s.method_name == call.method_name) {
                seen.push(call.clone());
            }
        }
        seen
    }
}
