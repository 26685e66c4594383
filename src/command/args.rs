//! Resolution of loose, variable-arity argument lists.
//!
//! A call may omit the server, pass one service or a list of them, and end
//! with an options object. `resolve` turns that into a server, the ordered
//! positional arguments, and an options map.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One loosely-typed argument of a variable-arity call
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// An explicitly omitted value, such as a `None` server
    Absent,
    Value(String),
    List(Vec<String>),
    Options(Map<String, Value>),
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Value(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Value(value)
    }
}

impl From<Option<&str>> for Arg {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Arg::Absent, Arg::from)
    }
}

impl From<Option<String>> for Arg {
    fn from(value: Option<String>) -> Self {
        value.map_or(Arg::Absent, Arg::Value)
    }
}

impl From<Vec<String>> for Arg {
    fn from(values: Vec<String>) -> Self {
        Arg::List(values)
    }
}

impl From<Vec<&str>> for Arg {
    fn from(values: Vec<&str>) -> Self {
        Arg::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Arg {
    fn from(values: &[&str]) -> Self {
        Arg::List(values.iter().map(|value| value.to_string()).collect())
    }
}

impl From<Map<String, Value>> for Arg {
    fn from(options: Map<String, Value>) -> Self {
        Arg::Options(options)
    }
}

/// A positional argument left after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Positional {
    Absent,
    Single(String),
    List(Vec<String>),
}

impl Positional {
    /// The names this positional addresses, a single value counting as a list of one
    pub fn names(&self) -> Vec<String> {
        match self {
            Positional::Absent => Vec::new(),
            Positional::Single(value) => vec![value.clone()],
            Positional::List(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedArgs {
    pub server: Option<String>,
    pub args: Vec<Positional>,
    pub options: Map<String, Value>,
}

impl ResolvedArgs {
    /// Positional at `index` as a single value
    pub fn single(&self, index: usize, what: &str) -> Result<String> {
        match self.args.get(index) {
            Some(Positional::Single(value)) => Ok(value.clone()),
            Some(Positional::List(_)) => Err(Error::InvalidArguments(format!(
                "{} must be a single value, not a list",
                what
            ))),
            Some(Positional::Absent) | None => {
                Err(Error::InvalidArguments(format!("missing {}", what)))
            }
        }
    }

    /// Positional at `index` as one or more names
    pub fn names(&self, index: usize, what: &str) -> Result<Vec<String>> {
        let names = self.args.get(index).map(Positional::names).unwrap_or_default();
        if names.is_empty() {
            return Err(Error::InvalidArguments(format!("missing {}", what)));
        }
        Ok(names)
    }

    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.options.clone()))?)
    }
}

/// Splits a loose argument list into server, positionals and options.
///
/// A trailing options object is removed first. If exactly `fixed` arguments
/// remain, the first of them is the server.
pub fn resolve(mut args: Vec<Arg>, fixed: usize) -> Result<ResolvedArgs> {
    let options = match args.last() {
        Some(Arg::Options(_)) => match args.pop() {
            Some(Arg::Options(options)) => options,
            _ => Map::new(),
        },
        _ => Map::new(),
    };

    let mut server = None;
    if fixed > 0 && args.len() == fixed {
        server = match args.remove(0) {
            Arg::Value(value) if !value.is_empty() => Some(value),
            Arg::Value(_) | Arg::Absent => None,
            Arg::List(_) => {
                return Err(Error::InvalidArguments(
                    "server must be a single name, not a list".to_string(),
                ));
            }
            Arg::Options(_) => {
                return Err(Error::InvalidArguments(
                    "options must be the last argument".to_string(),
                ));
            }
        };
    }

    let args = args
        .into_iter()
        .map(|arg| match arg {
            Arg::Absent => Ok(Positional::Absent),
            Arg::Value(value) => Ok(Positional::Single(value)),
            Arg::List(values) => Ok(Positional::List(values)),
            Arg::Options(_) => Err(Error::InvalidArguments(
                "options must be the last argument".to_string(),
            )),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedArgs {
        server,
        args,
        options,
    })
}

/// A request family that can be built from a loose argument list
pub trait FromArgs: Sized {
    /// Positional count (server slot included) at which the first argument is the server
    const FIXED: usize;

    fn from_resolved(resolved: ResolvedArgs) -> Result<Self>;

    fn from_args(args: Vec<Arg>) -> Result<Self> {
        Self::from_resolved(resolve(args, Self::FIXED)?)
    }
}
