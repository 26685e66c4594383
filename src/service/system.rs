use super::ServiceManager;
use crate::command::{BootRequest, ServerRequest, sc};
use crate::error::Result;
use crate::parser;
use crate::records::LockRecord;

impl ServiceManager {
    /// Marks the last boot as good or bad
    pub async fn set_boot(&self, request: &BootRequest) -> Result<()> {
        self.run_sc(&sc::set_boot(request)).await?;
        Ok(())
    }

    pub async fn lock(&self, request: &ServerRequest) -> Result<()> {
        self.run_sc(&sc::lock(request)).await?;
        Ok(())
    }

    pub async fn lock_status(&self, request: &ServerRequest) -> Result<LockRecord> {
        let output = self.run_sc(&sc::get_lock(request)).await?;
        Ok(parser::sc::lock(&output))
    }
}
