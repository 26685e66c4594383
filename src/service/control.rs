use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::ServiceManager;
use crate::command::{
    BatchDescription, CommandDescription, ControlRequest, QueryRequest, ServiceRequest,
    ValueRequest, sc, tasklist,
};
use crate::coordinator::{self, Convergence, FanOut, ItemReport};
use crate::error::Result;
use crate::exec::{self, ProcessExecutor};
use crate::parser;
use crate::records::{ProcessRecord, ServiceRecord, ServiceStatus};

fn target_name(item: &CommandDescription) -> &str {
    item.target().unwrap_or_default()
}

// tasklist reports failures as plain text
fn raw_output(output: &str) -> String {
    output.to_string()
}

/// Converges when a service reports the target state
pub struct StateTransition {
    executor: Arc<dyn ProcessExecutor>,
    command: String,
    target: ServiceStatus,
}

impl StateTransition {
    pub fn new(executor: Arc<dyn ProcessExecutor>, command: &str, target: ServiceStatus) -> Self {
        Self {
            executor,
            command: command.to_string(),
            target,
        }
    }
}

#[async_trait]
impl Convergence for StateTransition {
    type Snapshot = Vec<ServiceRecord>;

    async fn initiate(&self, item: &CommandDescription) -> Result<()> {
        exec::execute(self.executor.as_ref(), item, parser::sc::error).await?;
        Ok(())
    }

    async fn poll(&self, item: &CommandDescription) -> Result<Vec<ServiceRecord>> {
        let mut request = QueryRequest::named(target_name(item));
        request.server = item.server().map(str::to_string);
        let output =
            exec::execute(self.executor.as_ref(), &sc::query(&request), parser::sc::error).await?;
        Ok(parser::sc::services(&output))
    }

    fn converged(&self, snapshot: &Vec<ServiceRecord>) -> bool {
        snapshot
            .first()
            .is_some_and(|service| service.state.code == self.target.code())
    }

    fn timeout_message(&self, item: &CommandDescription) -> String {
        format!("Timed out attempting to {} {}.", self.command, target_name(item))
    }
}

/// Converges when no process hosts the service any more
pub struct ProcessExit {
    executor: Arc<dyn ProcessExecutor>,
}

impl ProcessExit {
    pub fn new(executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Convergence for ProcessExit {
    type Snapshot = Vec<ProcessRecord>;

    async fn initiate(&self, item: &CommandDescription) -> Result<()> {
        exec::execute(self.executor.as_ref(), item, parser::sc::error).await?;
        Ok(())
    }

    async fn poll(&self, item: &CommandDescription) -> Result<Vec<ProcessRecord>> {
        let command = tasklist::hosting_processes(target_name(item), item.server());
        let output = exec::execute(self.executor.as_ref(), &command, raw_output).await?;
        Ok(parser::tasklist::processes(&output))
    }

    fn converged(&self, snapshot: &Vec<ProcessRecord>) -> bool {
        snapshot.is_empty()
    }

    fn timeout_message(&self, item: &CommandDescription) -> String {
        format!(
            "Timed out waiting for the {} service process to terminate.",
            target_name(item)
        )
    }
}

impl ServiceManager {
    async fn run_batch<C: Convergence>(
        &self,
        plan: C,
        batch: BatchDescription,
    ) -> Result<Vec<ItemReport>> {
        let settings = self.settings.poll_settings(batch.timeout);
        let fan_out = FanOut::from_serial(batch.serial);
        info!(
            "{} {} service(s), {:?}",
            batch.command,
            batch.items.len(),
            fan_out
        );
        coordinator::drive(Arc::new(plan), batch.items, fan_out, settings).await
    }

    async fn transition(
        &self,
        batch: BatchDescription,
        target: ServiceStatus,
    ) -> Result<Vec<ItemReport>> {
        let plan = StateTransition::new(Arc::clone(&self.executor), &batch.command, target);
        self.run_batch(plan, batch).await
    }

    /// Starts the services and waits until each reports RUNNING
    pub async fn start(&self, request: &ControlRequest) -> Result<Vec<ItemReport>> {
        self.transition(sc::start(request), ServiceStatus::Running).await
    }

    pub async fn pause(&self, request: &ControlRequest) -> Result<Vec<ItemReport>> {
        self.transition(sc::pause(request), ServiceStatus::Paused).await
    }

    /// `continue`, waiting for RUNNING
    pub async fn resume(&self, request: &ControlRequest) -> Result<Vec<ItemReport>> {
        self.transition(sc::resume(request), ServiceStatus::Running).await
    }

    /// Stops the services and waits for STOPPED, or for the hosting process
    /// to exit when `wait_for_exit` is set
    pub async fn stop(&self, request: &ControlRequest) -> Result<Vec<ItemReport>> {
        let batch = sc::stop(request);
        if batch.wait_for_exit {
            let plan = ProcessExit::new(Arc::clone(&self.executor));
            self.run_batch(plan, batch).await
        } else {
            self.transition(batch, ServiceStatus::Stopped).await
        }
    }

    /// Sends a named or numeric control code
    pub async fn control(&self, request: &ValueRequest) -> Result<()> {
        self.run_sc(&sc::control(request)).await?;
        Ok(())
    }

    pub async fn interrogate(&self, request: &ServiceRequest) -> Result<()> {
        self.run_sc(&sc::interrogate(request)).await?;
        Ok(())
    }
}
