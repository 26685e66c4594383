//! Service control sub-command catalog.

use super::options::{
    CONFIG_TABLE, ConfigOptions, FAILURE_TABLE, FailureOptions, QUERY_TABLE, encode_options,
    push_pair, to_map,
};
use super::requests::{
    BootRequest, ConfigRequest, ControlRequest, FailureRequest, QueryRequest, ServerRequest,
    ServiceRequest, ValueRequest,
};
use super::{BatchDescription, CommandDescription, build, remote_server};

/// "An instance of the service is already running"
pub const ERROR_SERVICE_ALREADY_RUNNING: i32 = 1056;

/// "The service has not been started"
pub const ERROR_SERVICE_NOT_ACTIVE: i32 = 1062;

const QUERY_BUFFER: u32 = 262_144;
const NAME_BUFFER: u32 = 4096;
const CONFIG_BUFFER: u32 = 8192;

fn build_simple(
    command: &str,
    server: Option<&str>,
    mut args: Vec<String>,
    buffer: Option<u32>,
) -> CommandDescription {
    if let Some(buffer) = buffer {
        args.push(buffer.to_string());
    }
    build(command, server, args, &[])
}

/// Expands a control request into one invocation per service
pub fn build_control(
    command: &str,
    request: &ControlRequest,
    success_codes: &[i32],
) -> BatchDescription {
    let server = remote_server(request.server.as_deref());
    let items = request
        .services
        .iter()
        .map(|service| {
            let mut args = Vec::with_capacity(request.options.args.len() + 1);
            args.push(service.clone());
            args.extend(request.options.args.iter().cloned());
            build(command, server, args, success_codes).with_target(service.clone())
        })
        .collect();

    BatchDescription {
        command: command.to_string(),
        items,
        server: server.map(str::to_string),
        serial: request.options.serial,
        wait_for_exit: request.options.wait_for_exit,
        timeout: request.options.timeout,
    }
}

pub fn start(request: &ControlRequest) -> BatchDescription {
    build_control("start", request, &[ERROR_SERVICE_ALREADY_RUNNING])
}

pub fn pause(request: &ControlRequest) -> BatchDescription {
    build_control("pause", request, &[])
}

pub fn resume(request: &ControlRequest) -> BatchDescription {
    build_control("continue", request, &[])
}

pub fn stop(request: &ControlRequest) -> BatchDescription {
    build_control("stop", request, &[ERROR_SERVICE_NOT_ACTIVE])
}

pub fn control(request: &ValueRequest) -> CommandDescription {
    build_simple(
        "control",
        request.server.as_deref(),
        vec![request.service.clone(), request.value.clone()],
        None,
    )
}

pub fn interrogate(request: &ServiceRequest) -> CommandDescription {
    single("interrogate", request, None)
}

fn single(command: &str, request: &ServiceRequest, buffer: Option<u32>) -> CommandDescription {
    build_simple(
        command,
        request.server.as_deref(),
        vec![request.service.clone()],
        buffer,
    )
}

fn config_args(service: &str, options: &ConfigOptions) -> Vec<String> {
    let mut args = vec![service.to_string()];
    encode_options(&mut args, CONFIG_TABLE, &to_map(options));
    args
}

pub fn create(request: &ConfigRequest) -> CommandDescription {
    build(
        "create",
        request.server.as_deref(),
        config_args(&request.service, &request.options),
        &[],
    )
}

pub fn set_config(request: &ConfigRequest) -> CommandDescription {
    build(
        "config",
        request.server.as_deref(),
        config_args(&request.service, &request.options),
        &[],
    )
}

pub fn get_config(request: &ServiceRequest) -> CommandDescription {
    single("qc", request, Some(CONFIG_BUFFER))
}

pub fn get_display_name(request: &ServiceRequest) -> CommandDescription {
    single("getdisplayname", request, Some(NAME_BUFFER))
}

/// `request.service` holds the display name to look up
pub fn get_key_name(request: &ServiceRequest) -> CommandDescription {
    single("getkeyname", request, Some(NAME_BUFFER))
}

pub fn get_description(request: &ServiceRequest) -> CommandDescription {
    single("qdescription", request, Some(CONFIG_BUFFER))
}

pub fn set_description(request: &ValueRequest) -> CommandDescription {
    build_simple(
        "description",
        request.server.as_deref(),
        vec![request.service.clone(), request.value.clone()],
        None,
    )
}

pub fn get_dependencies(request: &ServiceRequest) -> CommandDescription {
    single("enumdepend", request, Some(QUERY_BUFFER))
}

pub fn get_descriptor(request: &ServiceRequest) -> CommandDescription {
    single("sdshow", request, None)
}

pub fn set_descriptor(request: &ValueRequest) -> CommandDescription {
    build_simple(
        "sdset",
        request.server.as_deref(),
        vec![request.service.clone(), request.value.clone()],
        None,
    )
}

pub fn get_failure_config(request: &ServiceRequest) -> CommandDescription {
    single("qfailure", request, Some(CONFIG_BUFFER))
}

fn failure_args(service: &str, options: &FailureOptions) -> Vec<String> {
    let mut args = vec![service.to_string()];
    encode_options(&mut args, FAILURE_TABLE, &to_map(options));
    if let Some(token) = options.actions.as_ref().and_then(|actions| actions.token()) {
        push_pair(&mut args, "actions", token);
    }
    args
}

pub fn set_failure_config(request: &FailureRequest) -> CommandDescription {
    build(
        "failure",
        request.server.as_deref(),
        failure_args(&request.service, &request.options),
        &[],
    )
}

pub fn query(request: &QueryRequest) -> CommandDescription {
    let mut args = Vec::new();
    match request.options.name.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => args.push(name.to_string()),
        None => {
            encode_options(&mut args, QUERY_TABLE, &to_map(&request.options));
            push_pair(&mut args, "bufsize", QUERY_BUFFER.to_string());
        }
    }
    build("queryex", request.server.as_deref(), args, &[])
}

pub fn delete(request: &ServiceRequest) -> CommandDescription {
    single("delete", request, None)
}

pub fn set_boot(request: &BootRequest) -> CommandDescription {
    build_simple(
        "boot",
        request.server.as_deref(),
        vec![request.status.as_str().to_string()],
        None,
    )
}

pub fn lock(request: &ServerRequest) -> CommandDescription {
    build_simple("lock", request.server.as_deref(), Vec::new(), None)
}

pub fn get_lock(request: &ServerRequest) -> CommandDescription {
    build_simple("querylock", request.server.as_deref(), Vec::new(), None)
}
