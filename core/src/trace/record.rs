use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Caller entity recorded for top-level calls.
pub const ROOT_CALLER: &str = "<ROOT>";

/// Columns a trace export must provide, in export order.
pub const TRACE_HEADERS: [&str; 8] = [
    "entity",
    "method_name",
    "method_level",
    "filepath",
    "lineno",
    "caller_entity",
    "caller_method_name",
    "caller_method_level",
];

/// One recorded method call.
///
/// `lineno` keeps the export's text as-is; the call-site key is built from it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TraceRecord {
    pub entity: String,
    pub method_name: String,
    pub method_level: String,
    pub filepath: String,
    pub lineno: String,
    pub caller_entity: String,
    pub caller_method_name: String,
    pub caller_method_level: String,
}

impl TraceRecord {
    /// Key of the call site this record was observed at.
    pub fn site_key(&self) -> String {
        site_key(&self.filepath, &self.lineno)
    }

    /// The 1-based line number, or `None` unless `lineno` is a positive
    /// integer.
    pub fn line_number(&self) -> Option<u32> {
        self.lineno.parse().ok().filter(|n| *n > 0)
    }

    pub fn level(&self) -> MethodLevel {
        MethodLevel::from_label(&self.method_level)
    }

}

pub(crate) fn site_key(filepath: &str, lineno: impl Display) -> String {
    format!("{}:{}", filepath, lineno)
}

/// Whether a method was invoked on a class or on one of its instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodLevel {
    Class,
    Instance,
}

impl MethodLevel {
    /// Anything other than `"class"` is treated as an instance call.
    pub fn from_label(label: &str) -> Self {
        if label == "class" {
            MethodLevel::Class
        } else {
            MethodLevel::Instance
        }
    }

    /// Ruby documentation notation: `Klass.method` vs `Klass#method`.
    pub fn separator(self) -> char {
        match self {
            MethodLevel::Class => '.',
            MethodLevel::Instance => '#',
        }
    }
}
