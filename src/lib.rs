//! Automation over the Windows service control tool: builds invocations,
//! parses their output into typed records, and polls state-changing
//! operations until every target converges or times out.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod exec;
pub mod parser;
pub mod records;
pub mod service;

pub use config::Settings;
pub use error::{Error, Result};
pub use service::ServiceManager;
