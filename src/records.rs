//! Typed results parsed from tool output. Every query produces fresh records.

use serde::Serialize;

/// Service state codes reported by the service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Stopped = 1,
    StartPending = 2,
    StopPending = 3,
    Running = 4,
    ContinuePending = 5,
    PausePending = 6,
    Paused = 7,
}

impl ServiceStatus {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ServiceStatus::Stopped),
            2 => Some(ServiceStatus::StartPending),
            3 => Some(ServiceStatus::StopPending),
            4 => Some(ServiceStatus::Running),
            5 => Some(ServiceStatus::ContinuePending),
            6 => Some(ServiceStatus::PausePending),
            7 => Some(ServiceStatus::Paused),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

/// A numeric code with its symbolic name, e.g. `16 WIN32_OWN_PROCESS`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodedName {
    pub code: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceState {
    pub code: u32,
    pub name: String,
    pub running: bool,
    pub paused: bool,
    pub stopped: bool,
}

impl ServiceState {
    /// The three flags are derived from `code` alone
    pub fn new(code: u32, name: impl Into<String>) -> Self {
        let status = ServiceStatus::from_code(code);
        Self {
            code,
            name: name.into(),
            running: status == Some(ServiceStatus::Running),
            paused: status == Some(ServiceStatus::Paused),
            stopped: status == Some(ServiceStatus::Stopped),
        }
    }

    pub fn status(&self) -> Option<ServiceStatus> {
        ServiceStatus::from_code(self.code)
    }
}

/// One service from an enumeration (`queryex`, `enumdepend`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub service_type: CodedName,
    pub state: ServiceState,
    pub win32_exit_code: u32,
    pub service_exit_code: u32,
    pub checkpoint: u32,
    pub wait_hint: u32,
    /// Controls the service accepts, e.g. `STOPPABLE`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    #[serde(rename = "type")]
    pub service_type: CodedName,
    pub start_type: CodedName,
    pub error_control: CodedName,
    pub bin_path: String,
    pub load_order_group: String,
    pub tag: u32,
    pub display_name: String,
    pub dependencies: Vec<String>,
    pub service_start_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureConfigRecord {
    /// Seconds
    pub reset_period: u64,
    pub reboot_message: String,
    pub command_line: String,
    pub failure_actions: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockRecord {
    pub locked: bool,
    pub owner: String,
    /// Seconds since the lock was acquired
    pub duration: u64,
}

/// A row of the process listing tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub name: String,
    pub pid: u32,
    pub session_name: String,
    pub session: u32,
    pub memory: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_flag_for_terminal_codes() {
        for code in [1, 4, 7] {
            let state = ServiceState::new(code, "");
            let set = [state.running, state.paused, state.stopped]
                .iter()
                .filter(|flag| **flag)
                .count();
            assert_eq!(set, 1, "code {}", code);
        }
        assert!(ServiceState::new(4, "RUNNING").running);
        assert!(ServiceState::new(7, "PAUSED").paused);
        assert!(ServiceState::new(1, "STOPPED").stopped);
    }

    #[test]
    fn test_no_flag_for_pending_or_unknown_codes() {
        for code in [0, 2, 3, 5, 6, 8, 42] {
            let state = ServiceState::new(code, "");
            assert!(!state.running && !state.paused && !state.stopped, "code {}", code);
        }
    }

    #[test]
    fn test_status_codes() {
        for code in 1..=7 {
            assert_eq!(ServiceStatus::from_code(code).map(ServiceStatus::code), Some(code));
        }
        assert_eq!(ServiceStatus::from_code(0), None);
        assert_eq!(ServiceStatus::from_code(8), None);
    }

    #[test]
    fn test_service_record_serialization() {
        let record = ServiceRecord {
            name: "svc".into(),
            state: ServiceState::new(4, "RUNNING"),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"]["running"], true);
        assert_eq!(json["displayName"], "");
        assert!(json.get("pid").is_none());
        assert!(json.get("type").is_some());
    }
}
