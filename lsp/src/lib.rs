//! Language server that answers hovers from a recorded Rotoscope trace.

pub mod server;

pub use server::{evaluate_probe, run};
