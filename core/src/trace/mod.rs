//! Call-site index built from a Rotoscope CSV export.

mod index;
mod loader;
mod record;

pub use index::TraceIndex;
pub use loader::LoadSummary;
pub use record::{MethodLevel, ROOT_CALLER, TRACE_HEADERS, TraceRecord};
