pub mod args;
pub mod options;
pub mod requests;
pub mod sc;
pub mod tasklist;

use std::fmt;

pub use args::{Arg, FromArgs, Positional, ResolvedArgs, resolve};
pub use options::{
    BootStatus, ConfigOptions, ControlOptions, ErrorSeverity, FailureActions, FailureOptions,
    InteractType, QueryOptions, QueryState, ServiceClass, ServiceType, StartType,
};
pub use requests::{
    BootRequest, ConfigRequest, ControlRequest, FailureRequest, QueryRequest, ServerRequest,
    ServiceRequest, ValueRequest,
};

/// Service control tool binary
pub const SC: &str = "sc";

/// Process listing tool binary
pub const TASKLIST: &str = "tasklist";

/// A single executable invocation of a tool.
///
/// When a server is present its UNC form is always the first argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescription {
    executable: String,
    args: Vec<String>,
    success_codes: Vec<i32>,
    server: Option<String>,
    target: Option<String>,
}

impl CommandDescription {
    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Non-zero exit codes treated as success
    pub fn success_codes(&self) -> &[i32] {
        &self.success_codes
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Name of the service this invocation addresses, for batch items
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn accepts(&self, code: i32) -> bool {
        code == 0 || self.success_codes.contains(&code)
    }

    pub(crate) fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub(crate) fn new_raw(executable: &str, args: Vec<String>, server: Option<&str>) -> Self {
        Self {
            executable: executable.to_string(),
            args,
            success_codes: Vec::new(),
            server: server.map(str::to_string),
            target: None,
        }
    }
}

impl fmt::Display for CommandDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// One logical control operation across several services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDescription {
    pub command: String,
    pub items: Vec<CommandDescription>,
    pub server: Option<String>,
    pub serial: bool,
    pub wait_for_exit: bool,
    /// Per-call timeout in milliseconds, overriding the settings timeout
    pub timeout: Option<u64>,
}

/// Converts a computer name to a UNC host path with exactly two leading backslashes
pub fn qualify_unc_path(server: &str) -> String {
    format!(r"\\{}", server.trim_start_matches('\\'))
}

/// The server unless it names no host (empty or only backslashes)
pub(crate) fn remote_server(server: Option<&str>) -> Option<&str> {
    server.filter(|server| !server.trim_start_matches('\\').is_empty())
}

/// Builds a service control invocation.
///
/// Argument vector is `[\\server] command args...`, arguments kept in the order given.
pub fn build(
    command: &str,
    server: Option<&str>,
    args: Vec<String>,
    success_codes: &[i32],
) -> CommandDescription {
    let server = remote_server(server);

    let mut argv = Vec::with_capacity(args.len() + 2);
    if let Some(server) = server {
        argv.push(qualify_unc_path(server));
    }
    argv.push(command.to_string());
    argv.extend(args);

    CommandDescription {
        executable: SC.to_string(),
        args: argv,
        success_codes: success_codes.to_vec(),
        server: server.map(str::to_string),
        target: None,
    }
}
