//! Resolve a cursor position on a line of Ruby source to the calls a
//! Rotoscope trace recorded at that call site.

pub mod engine;
pub mod eval;
pub mod token;
pub mod trace;

pub use engine::{Engine, Resolution};
pub use eval::{ClassEvaluation, Evaluation, InstanceEvaluation, MethodEvaluation};
pub use token::{Token, parse_token};
pub use trace::{LoadSummary, MethodLevel, TraceIndex, TraceRecord};
