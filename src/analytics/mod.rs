//! Search diagnostics: the JSONL event log and its history report.

pub mod events;
pub mod reporter;

pub use events::{Event, EventKind, EventLog};
