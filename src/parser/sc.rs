use regex::Regex;

use super::fields::{
    blocks, boolean, coded_name, first_line, flag_list, numeric, prefixed_number, repeated,
    scalar,
};
use crate::records::{
    CodedName, ConfigRecord, FailureConfigRecord, LockRecord, ServiceRecord, ServiceState,
};

// Out-of-range values fall back to the default like absent ones
fn narrow(value: Option<u64>) -> u32 {
    value.and_then(|value| u32::try_from(value).ok()).unwrap_or(0)
}

fn number_or_zero(source: &str, label: &str, hex: bool) -> u32 {
    narrow(numeric(source, label, hex))
}

fn text_or_empty(source: &str, label: &str) -> String {
    scalar(source, label).unwrap_or_default()
}

fn coded(source: &str, label: &str) -> CodedName {
    CodedName {
        code: number_or_zero(source, label, true),
        name: coded_name(source, label).unwrap_or_default(),
    }
}

/// Error description of a failed invocation.
///
/// An explicit `ERROR` field wins, then the message following an `[SC]` status
/// line, then the raw output itself.
pub fn error(output: &str) -> String {
    if let Some(message) = scalar(output, "ERROR").filter(|message| !message.is_empty()) {
        return message;
    }
    let status_line = Regex::new(r"^\s*\[SC\].*\s*(.*)").ok().and_then(|regex| {
        regex
            .captures(output)
            .and_then(|captures| captures.get(1))
            .map(|message| message.as_str().trim().to_string())
    });
    match status_line.filter(|message| !message.is_empty()) {
        Some(message) => message,
        None => output.trim().to_string(),
    }
}

pub fn display_name(output: &str) -> String {
    scalar(output, "Name").unwrap_or_else(|| output.to_string())
}

pub fn key_name(output: &str) -> String {
    scalar(output, "Name").unwrap_or_else(|| output.to_string())
}

pub fn description(output: &str) -> String {
    scalar(output, "DESCRIPTION").unwrap_or_else(|| output.to_string())
}

/// Security descriptor in SDDL form
pub fn descriptor(output: &str) -> String {
    first_line(output).unwrap_or(output).to_string()
}

pub fn lock(output: &str) -> LockRecord {
    LockRecord {
        locked: boolean(output, "IsLocked").unwrap_or(false),
        owner: text_or_empty(output, "LockOwner"),
        duration: numeric(output, "LockDuration", false).unwrap_or(0),
    }
}

pub fn failure_config(output: &str) -> FailureConfigRecord {
    FailureConfigRecord {
        reset_period: numeric(output, "RESET_PERIOD (in seconds)", false).unwrap_or(0),
        reboot_message: text_or_empty(output, "REBOOT_MESSAGE"),
        command_line: text_or_empty(output, "COMMAND_LINE"),
        failure_actions: text_or_empty(output, "FAILURE_ACTIONS"),
    }
}

pub fn config(output: &str) -> ConfigRecord {
    ConfigRecord {
        service_type: coded(output, "TYPE"),
        start_type: coded(output, "START_TYPE"),
        error_control: coded(output, "ERROR_CONTROL"),
        bin_path: text_or_empty(output, "BINARY_PATH_NAME"),
        load_order_group: text_or_empty(output, "LOAD_ORDER_GROUP"),
        tag: number_or_zero(output, "TAG", false),
        display_name: text_or_empty(output, "DISPLAY_NAME"),
        dependencies: repeated(output, "DEPENDENCIES"),
        service_start_name: text_or_empty(output, "SERVICE_START_NAME"),
    }
}

fn service(block: &str) -> ServiceRecord {
    let state = coded(block, "STATE");
    ServiceRecord {
        name: text_or_empty(block, "SERVICE_NAME"),
        display_name: text_or_empty(block, "DISPLAY_NAME"),
        service_type: coded(block, "TYPE"),
        state: ServiceState::new(state.code, state.name),
        win32_exit_code: number_or_zero(block, "WIN32_EXIT_CODE", false),
        service_exit_code: number_or_zero(block, "SERVICE_EXIT_CODE", false),
        checkpoint: narrow(prefixed_number(block, "CHECKPOINT")),
        wait_hint: narrow(prefixed_number(block, "WAIT_HINT")),
        accepted: flag_list(block, "STATE").filter(|flags| !flags.is_empty()),
        pid: numeric(block, "PID", false)
            .and_then(|pid| u32::try_from(pid).ok())
            .filter(|pid| *pid != 0),
        flags: scalar(block, "FLAGS").filter(|flags| !flags.is_empty()),
    }
}

/// Services of an enumeration, one per `SERVICE_NAME` block
pub fn services(output: &str) -> Vec<ServiceRecord> {
    blocks(output, "SERVICE_NAME")
        .into_iter()
        .map(service)
        .collect()
}
