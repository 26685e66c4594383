//! Typed option sets and their table-driven `name= value` encoding.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maps a tool keyword to the options-map key it is read from.
/// Emission follows table order, never the map's key order.
pub type OptionTable = &'static [(&'static str, &'static str)];

pub const CONFIG_TABLE: OptionTable = &[
    ("type", "type"),
    ("type", "interact"),
    ("start", "start"),
    ("error", "error"),
    ("binpath", "binpath"),
    ("group", "group"),
    ("tag", "tag"),
    ("depend", "depend"),
    ("obj", "obj"),
    ("displayname", "displayname"),
    ("password", "password"),
];

pub const FAILURE_TABLE: OptionTable = &[
    ("reset", "reset"),
    ("reboot", "reboot"),
    ("command", "command"),
];

pub const QUERY_TABLE: OptionTable = &[
    ("type", "class"),
    ("type", "type"),
    ("state", "state"),
    ("group", "group"),
];

/// Renders one option value as a tool token.
///
/// Null, `0`, empty strings and empty lists are not emitted. Booleans become
/// `yes`/`no`, lists are joined with `/`.
pub fn option_token(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        Value::Number(number) => {
            if number.as_f64() == Some(0.0) {
                None
            } else {
                Some(number.to_string())
            }
        }
        Value::String(text) => (!text.is_empty()).then(|| text.clone()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");
            (!joined.is_empty()).then_some(joined)
        }
    }
}

/// Appends `keyword= value` pairs for every table entry with an emittable value
pub fn encode_options(args: &mut Vec<String>, table: OptionTable, options: &Map<String, Value>) {
    for (keyword, key) in table {
        if let Some(token) = options.get(*key).and_then(option_token) {
            push_pair(args, keyword, token);
        }
    }
}

pub(crate) fn push_pair(args: &mut Vec<String>, keyword: &str, value: String) {
    args.push(format!("{}=", keyword));
    args.push(value);
}

pub(crate) fn to_map<T: Serialize>(options: &T) -> Map<String, Value> {
    match serde_json::to_value(options) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Own,
    Share,
    Kernel,
    Filesys,
    Rec,
    Adapt,
    Interact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InteractType {
    Own,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StartType {
    Boot,
    System,
    Auto,
    Demand,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Normal,
    Severe,
    Critical,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceClass {
    Driver,
    Service,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryState {
    Active,
    Inactive,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BootStatus {
    Ok,
    Bad,
}

impl BootStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootStatus::Ok => "ok",
            BootStatus::Bad => "bad",
        }
    }
}

/// Options shared by start/pause/continue/stop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlOptions {
    /// Drive services one at a time instead of concurrently
    pub serial: bool,

    /// Per-call timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Extra arguments passed to each service
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Stop only: wait for the hosting process to exit rather than for STOPPED
    pub wait_for_exit: bool,
}

/// Options for `create` and `config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    /// Only meaningful with a type of `interact`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interact: Option<InteractType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<StartType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binpath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depend: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obj: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub displayname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Delays in milliseconds for each failure action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureActions {
    pub restart: Option<u64>,
    pub run: Option<u64>,
    pub reboot: Option<u64>,
}

impl FailureActions {
    /// `restart/<ms>/run/<ms>/reboot/<ms>`, skipping unset or zero delays
    pub fn token(&self) -> Option<String> {
        let parts: Vec<String> = [
            ("restart", self.restart),
            ("run", self.run),
            ("reboot", self.reboot),
        ]
        .into_iter()
        .filter_map(|(action, delay)| match delay {
            Some(delay) if delay > 0 => Some(format!("{}/{}", action, delay)),
            _ => None,
        })
        .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}

/// Options for `failure`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureOptions {
    /// Seconds without failure after which the failure count resets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reboot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<FailureActions>,
}

/// Options for `queryex`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Query a single service; the other filters are ignored when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ServiceClass>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<QueryState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}
