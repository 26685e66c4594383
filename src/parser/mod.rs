//! Parsers for the human-readable output of the service control and process
//! listing tools. Malformed or missing fields fall back to defaults; parsing
//! never fails.

pub mod fields;
pub mod sc;
pub mod tasklist;
