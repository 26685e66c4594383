//! One explicit request per operation family.
//!
//! Each request can be built directly or from a loose argument list through
//! [`FromArgs`], which routes all server/list/options disambiguation through
//! [`resolve`](super::args::resolve).

use super::args::{FromArgs, ResolvedArgs};
use super::options::{BootStatus, ConfigOptions, ControlOptions, FailureOptions, QueryOptions};
use crate::error::{Error, Result};

/// start / pause / continue / stop on one or more services
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlRequest {
    pub server: Option<String>,
    pub services: Vec<String>,
    pub options: ControlOptions,
}

impl ControlRequest {
    pub fn new<I, S>(services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            server: None,
            services: services.into_iter().map(Into::into).collect(),
            options: ControlOptions::default(),
        }
    }

    pub fn on(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn serial(mut self) -> Self {
        self.options.serial = true;
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn wait_for_exit(mut self) -> Self {
        self.options.wait_for_exit = true;
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl FromArgs for ControlRequest {
    const FIXED: usize = 2;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        Ok(Self {
            services: resolved.names(0, "service name")?,
            options: resolved.options_as()?,
            server: resolved.server,
        })
    }
}

/// A sub-command addressing a single service (or display name)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRequest {
    pub server: Option<String>,
    pub service: String,
}

impl ServiceRequest {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            server: None,
            service: service.into(),
        }
    }

    pub fn on(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

impl FromArgs for ServiceRequest {
    const FIXED: usize = 2;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        Ok(Self {
            service: resolved.single(0, "service name")?,
            server: resolved.server,
        })
    }
}

/// A sub-command taking a service and one value: control code, description, descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueRequest {
    pub server: Option<String>,
    pub service: String,
    pub value: String,
}

impl ValueRequest {
    pub fn new(service: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            server: None,
            service: service.into(),
            value: value.into(),
        }
    }

    pub fn on(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

impl FromArgs for ValueRequest {
    const FIXED: usize = 3;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        Ok(Self {
            service: resolved.single(0, "service name")?,
            value: resolved.single(1, "value")?,
            server: resolved.server,
        })
    }
}

/// create / config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRequest {
    pub server: Option<String>,
    pub service: String,
    pub options: ConfigOptions,
}

impl ConfigRequest {
    pub fn new(service: impl Into<String>, options: ConfigOptions) -> Self {
        Self {
            server: None,
            service: service.into(),
            options,
        }
    }

    pub fn on(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

impl FromArgs for ConfigRequest {
    const FIXED: usize = 2;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        Ok(Self {
            service: resolved.single(0, "service name")?,
            options: resolved.options_as()?,
            server: resolved.server,
        })
    }
}

/// failure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureRequest {
    pub server: Option<String>,
    pub service: String,
    pub options: FailureOptions,
}

impl FailureRequest {
    pub fn new(service: impl Into<String>, options: FailureOptions) -> Self {
        Self {
            server: None,
            service: service.into(),
            options,
        }
    }

    pub fn on(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

impl FromArgs for FailureRequest {
    const FIXED: usize = 2;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        Ok(Self {
            service: resolved.single(0, "service name")?,
            options: resolved.options_as()?,
            server: resolved.server,
        })
    }
}

/// queryex
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub server: Option<String>,
    pub options: QueryOptions,
}

impl QueryRequest {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            server: None,
            options,
        }
    }

    /// Query a single service by name
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(QueryOptions {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    pub fn on(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

impl FromArgs for QueryRequest {
    const FIXED: usize = 1;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        if !resolved.args.is_empty() {
            return Err(Error::InvalidArguments(
                "query takes only a server and options".to_string(),
            ));
        }
        Ok(Self {
            options: resolved.options_as()?,
            server: resolved.server,
        })
    }
}

/// boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRequest {
    pub server: Option<String>,
    pub status: BootStatus,
}

impl BootRequest {
    pub fn new(status: BootStatus) -> Self {
        Self {
            server: None,
            status,
        }
    }

    pub fn on(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

impl FromArgs for BootRequest {
    const FIXED: usize = 2;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        let status = match resolved.single(0, "boot status")?.as_str() {
            "ok" => BootStatus::Ok,
            "bad" => BootStatus::Bad,
            other => {
                return Err(Error::InvalidArguments(format!(
                    "boot status must be ok or bad, got {:?}",
                    other
                )));
            }
        };
        Ok(Self {
            server: resolved.server,
            status,
        })
    }
}

/// lock / querylock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRequest {
    pub server: Option<String>,
}

impl ServerRequest {
    pub fn local() -> Self {
        Self::default()
    }

    pub fn on(server: impl Into<String>) -> Self {
        Self {
            server: Some(server.into()),
        }
    }
}

impl FromArgs for ServerRequest {
    const FIXED: usize = 1;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self> {
        Ok(Self {
            server: resolved.server,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::args::Arg;
    use serde_json::{Value, json};

    fn options(value: Value) -> Arg {
        match value {
            Value::Object(map) => Arg::Options(map),
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_control_request_from_args() {
        let request = ControlRequest::from_args(vec![
            "box".into(),
            vec!["a", "b"].into(),
            options(json!({ "serial": true, "args": ["--verbose"] })),
        ])
        .unwrap();

        assert_eq!(request, ControlRequest::new(["a", "b"]).on("box").serial().args(["--verbose"]));
    }

    #[test]
    fn test_control_request_single_service() {
        let request = ControlRequest::from_args(vec!["svc".into()]).unwrap();
        assert_eq!(request.services, ["svc"]);
        assert!(request.server.is_none());
    }

    #[test]
    fn test_control_request_requires_service() {
        assert!(ControlRequest::from_args(Vec::new()).is_err());
        assert!(ControlRequest::from_args(vec![Vec::<String>::new().into()]).is_err());
    }

    #[test]
    fn test_bad_options_surface_as_error() {
        let err = ControlRequest::from_args(vec![
            "svc".into(),
            options(json!({ "serial": "sometimes" })),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Options(_)));
    }

    #[test]
    fn test_value_request_from_args() {
        let request =
            ValueRequest::from_args(vec!["box".into(), "svc".into(), "paramchange".into()])
                .unwrap();
        assert_eq!(request, ValueRequest::new("svc", "paramchange").on("box"));
    }

    #[test]
    fn test_config_request_from_args() {
        let request = ConfigRequest::from_args(vec![
            "svc".into(),
            options(json!({ "type": "own", "binpath": "C:\\svc.exe", "tag": true })),
        ])
        .unwrap();
        assert_eq!(request.service, "svc");
        assert_eq!(request.options.binpath.as_deref(), Some("C:\\svc.exe"));
        assert_eq!(request.options.tag, Some(true));
    }

    #[test]
    fn test_query_request_from_args() {
        let request =
            QueryRequest::from_args(vec!["box".into(), options(json!({ "name": "svc" }))])
                .unwrap();
        assert_eq!(request, QueryRequest::named("svc").on("box"));

        let request = QueryRequest::from_args(vec![options(json!({ "state": "all" }))]).unwrap();
        assert!(request.server.is_none());
    }

    #[test]
    fn test_boot_request_from_args() {
        let request = BootRequest::from_args(vec!["box".into(), "bad".into()]).unwrap();
        assert_eq!(request, BootRequest::new(BootStatus::Bad).on("box"));
        assert!(BootRequest::from_args(vec!["maybe".into()]).is_err());
    }

    #[test]
    fn test_server_request_from_args() {
        assert_eq!(ServerRequest::from_args(Vec::new()).unwrap(), ServerRequest::local());
        assert_eq!(ServerRequest::from_args(vec!["box".into()]).unwrap(), ServerRequest::on("box"));
    }
}
