use super::ServiceManager;
use crate::command::{ConfigRequest, FailureRequest, QueryRequest, ServiceRequest, ValueRequest, sc};
use crate::error::Result;
use crate::parser;
use crate::records::{ConfigRecord, FailureConfigRecord, ServiceRecord};

impl ServiceManager {
    pub async fn create(&self, request: &ConfigRequest) -> Result<()> {
        self.run_sc(&sc::create(request)).await?;
        Ok(())
    }

    pub async fn delete(&self, request: &ServiceRequest) -> Result<()> {
        self.run_sc(&sc::delete(request)).await?;
        Ok(())
    }

    pub async fn display_name(&self, request: &ServiceRequest) -> Result<String> {
        let output = self.run_sc(&sc::get_display_name(request)).await?;
        Ok(parser::sc::display_name(&output))
    }

    /// Service key name for the display name in `request.service`
    pub async fn key_name(&self, request: &ServiceRequest) -> Result<String> {
        let output = self.run_sc(&sc::get_key_name(request)).await?;
        Ok(parser::sc::key_name(&output))
    }

    pub async fn description(&self, request: &ServiceRequest) -> Result<String> {
        let output = self.run_sc(&sc::get_description(request)).await?;
        Ok(parser::sc::description(&output))
    }

    pub async fn set_description(&self, request: &ValueRequest) -> Result<()> {
        self.run_sc(&sc::set_description(request)).await?;
        Ok(())
    }

    /// Services that depend on the service
    pub async fn dependencies(&self, request: &ServiceRequest) -> Result<Vec<ServiceRecord>> {
        let output = self.run_sc(&sc::get_dependencies(request)).await?;
        Ok(parser::sc::services(&output))
    }

    pub async fn descriptor(&self, request: &ServiceRequest) -> Result<String> {
        let output = self.run_sc(&sc::get_descriptor(request)).await?;
        Ok(parser::sc::descriptor(&output))
    }

    pub async fn set_descriptor(&self, request: &ValueRequest) -> Result<()> {
        self.run_sc(&sc::set_descriptor(request)).await?;
        Ok(())
    }

    pub async fn config(&self, request: &ServiceRequest) -> Result<ConfigRecord> {
        let output = self.run_sc(&sc::get_config(request)).await?;
        Ok(parser::sc::config(&output))
    }

    pub async fn set_config(&self, request: &ConfigRequest) -> Result<()> {
        self.run_sc(&sc::set_config(request)).await?;
        Ok(())
    }

    pub async fn failure_config(&self, request: &ServiceRequest) -> Result<FailureConfigRecord> {
        let output = self.run_sc(&sc::get_failure_config(request)).await?;
        Ok(parser::sc::failure_config(&output))
    }

    pub async fn set_failure_config(&self, request: &FailureRequest) -> Result<()> {
        self.run_sc(&sc::set_failure_config(request)).await?;
        Ok(())
    }

    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<ServiceRecord>> {
        let output = self.run_sc(&sc::query(request)).await?;
        Ok(parser::sc::services(&output))
    }
}
