use rustc_hash::FxHashMap;

use super::record::{TraceRecord, site_key};

/// Recorded calls grouped by call site (`filepath:lineno`).
///
/// Built once per trace load and only read afterwards. Records under a key
/// keep the order they were loaded in.
#[derive(Debug, Default, Clone)]
pub struct TraceIndex {
    sites: FxHashMap<String, Vec<TraceRecord>>,
    records: usize,
}

impl TraceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: TraceRecord) {
        self.sites.entry(record.site_key()).or_default().push(record);
        self.records += 1;
    }

    /// Every call recorded at `filepath:lineno` (1-based line).
    pub fn calls_at(&self, filepath: &str, lineno: u32) -> &[TraceRecord] {
        self.sites
            .get(&site_key(filepath, lineno))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Calls at the site whose method name is exactly `name`, or `None` when
    /// nothing matches.
    pub fn lookup(&self, filepath: &str, lineno: u32, name: &str) -> Option<Vec<&TraceRecord>> {
        let calls: Vec<&TraceRecord> = self
            .calls_at(filepath, lineno)
            .iter()
            .filter(|call| call.method_name == name)
            .collect();
        if calls.is_empty() { None } else { Some(calls) }
    }

    /// Number of distinct call sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.records
    }
}

impl FromIterator<TraceRecord> for TraceIndex {
    fn from_iter<I: IntoIterator<Item = TraceRecord>>(iter: I) -> Self {
        let mut index = TraceIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
