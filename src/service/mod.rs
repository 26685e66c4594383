mod control;
mod management;
mod system;

use std::sync::Arc;

pub use control::{ProcessExit, StateTransition};

use crate::command::CommandDescription;
use crate::config::Settings;
use crate::error::Result;
use crate::exec::{self, ProcessExecutor, SystemExecutor};
use crate::parser;

/// Entry point for every service control operation.
///
/// Cheap to clone; the executor is shared and the settings are copied.
#[derive(Clone)]
pub struct ServiceManager {
    executor: Arc<dyn ProcessExecutor>,
    settings: Settings,
}

impl ServiceManager {
    /// Manager backed by the real tools
    pub fn new(settings: Settings) -> Self {
        Self::with_executor(Arc::new(SystemExecutor), settings)
    }

    pub fn with_executor(executor: Arc<dyn ProcessExecutor>, settings: Settings) -> Self {
        Self { executor, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    async fn run_sc(&self, command: &CommandDescription) -> Result<String> {
        exec::execute(self.executor.as_ref(), command, parser::sc::error).await
    }
}
