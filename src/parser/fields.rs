//! Field extraction primitives over `LABEL : value` style text.
//!
//! Each primitive returns `None` (or an empty list) when the field is absent
//! so call sites choose their own default.

use regex::{Regex, RegexBuilder};

fn label_pattern(label: &str) -> String {
    let escaped = regex::escape(label);
    // Keep `TYPE` from matching inside `START_TYPE`
    if label.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        format!(r"\b{}", escaped)
    } else {
        escaped
    }
}

fn capture(source: &str, pattern: &str) -> Option<String> {
    let regex = Regex::new(pattern).ok()?;
    regex
        .captures(source)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().trim().to_string())
}

/// Parses `0x`-prefixed text as base 16, anything else in `radix`
pub fn parse_number(text: &str, radix: u32) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16).ok(),
        None => u64::from_str_radix(text, radix).ok(),
    }
}

/// Rest of the line after `label` and a `=` or `:` separator, trimmed
pub fn scalar(source: &str, label: &str) -> Option<String> {
    capture(source, &format!(r"{}\s*[=:](.*)", label_pattern(label)))
}

/// Symbolic name of a `LABEL : <code> <NAME>` field, code dropped
pub fn coded_name(source: &str, label: &str) -> Option<String> {
    capture(source, &format!(r"{}\s*[=:]\s*\d*\s*(.*)", label_pattern(label)))
}

/// Leading number of a field.
///
/// With `hex` the digits are base 16 whether or not they carry a `0x`
/// prefix; otherwise they are decimal unless prefixed.
pub fn numeric(source: &str, label: &str, hex: bool) -> Option<u64> {
    let label = label_pattern(label);
    let pattern = if hex {
        format!(r"{}\s*[=:]\s*((?:0[xX])?[0-9A-Fa-f]+)\b", label)
    } else {
        format!(r"{}\s*[=:]\s*(0[xX][0-9A-Fa-f]+|\d+)", label)
    };
    let digits = capture(source, &pattern)?;
    parse_number(&digits, if hex { 16 } else { 10 })
}

/// First token of a scalar field as a number, honoring a `0x` prefix
pub fn prefixed_number(source: &str, label: &str) -> Option<u64> {
    let value = scalar(source, label)?;
    parse_number(value.split_whitespace().next()?, 10)
}

/// `true`/`false` field, case-insensitive
pub fn boolean(source: &str, label: &str) -> Option<bool> {
    let pattern = format!(r"{}\s*[=:]\s*(true|false)", label_pattern(label));
    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;
    let captures = regex.captures(source)?;
    Some(captures.get(1)?.as_str().eq_ignore_ascii_case("true"))
}

/// Parenthesized, comma-separated list on the line after `label`
pub fn flag_list(source: &str, label: &str) -> Option<Vec<String>> {
    let list = capture(source, &format!(r"{}\s*:\s.*\s*\((.*)\)", label_pattern(label)))?;
    Some(
        list.split(',')
            .map(str::trim)
            .filter(|flag| !flag.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Values of a field continued over several `: value` lines
pub fn repeated(source: &str, label: &str) -> Vec<String> {
    let Some(block) = capture(source, &format!(r"{}((?:\s*:.*)*)", label_pattern(label))) else {
        return Vec::new();
    };
    block
        .lines()
        .filter_map(|line| line.trim().strip_prefix(':'))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Blank-line separated blocks that contain `anchor`
pub fn blocks<'a>(source: &'a str, anchor: &str) -> Vec<&'a str> {
    let Ok(separator) = Regex::new(r"\r?\n[ \t]*\r?\n") else {
        return Vec::new();
    };
    separator
        .split(source)
        .filter(|block| block.contains(anchor))
        .collect()
}

/// First non-blank line, trimmed
pub fn first_line(source: &str) -> Option<&str> {
    source.lines().map(str::trim).find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QC: &str = "[SC] QueryServiceConfig SUCCESS\r\n\
\r\n\
SERVICE_NAME: wuauserv\r\n\
        TYPE               : 20  WIN32_SHARE_PROCESS\r\n\
        START_TYPE         : 3   DEMAND_START\r\n\
        ERROR_CONTROL      : 1   NORMAL\r\n\
        BINARY_PATH_NAME   : C:\\Windows\\system32\\svchost.exe -k netsvcs -p\r\n\
        LOAD_ORDER_GROUP   :\r\n\
        TAG                : 0\r\n\
        DISPLAY_NAME       : Windows Update\r\n\
        DEPENDENCIES       : rpcss\r\n\
                           : Tcpip\r\n\
        SERVICE_START_NAME : LocalSystem\r\n";

    #[test]
    fn test_scalar() {
        assert_eq!(scalar(QC, "DISPLAY_NAME").as_deref(), Some("Windows Update"));
        assert_eq!(
            scalar(QC, "BINARY_PATH_NAME").as_deref(),
            Some(r"C:\Windows\system32\svchost.exe -k netsvcs -p")
        );
        assert_eq!(scalar(QC, "LOAD_ORDER_GROUP").as_deref(), Some(""));
        assert_eq!(scalar(QC, "MISSING"), None);
    }

    #[test]
    fn test_scalar_equals_separator() {
        assert_eq!(scalar("Name = Windows Update", "Name").as_deref(), Some("Windows Update"));
    }

    #[test]
    fn test_label_does_not_match_suffix() {
        let source = "START_TYPE : 3 DEMAND_START\nTYPE : 10 WIN32_OWN_PROCESS";
        assert_eq!(coded_name(source, "TYPE").as_deref(), Some("WIN32_OWN_PROCESS"));
        assert_eq!(numeric(source, "TYPE", true), Some(16));
    }

    #[test]
    fn test_coded_name() {
        assert_eq!(coded_name(QC, "TYPE").as_deref(), Some("WIN32_SHARE_PROCESS"));
        assert_eq!(coded_name(QC, "START_TYPE").as_deref(), Some("DEMAND_START"));
    }

    #[test]
    fn test_numeric_decimal() {
        assert_eq!(numeric(QC, "TAG", false), Some(0));
        assert_eq!(numeric("WIN32_EXIT_CODE : 1077  (0x435)", "WIN32_EXIT_CODE", false), Some(1077));
        assert_eq!(numeric("PID : 0x10", "PID", false), Some(16));
        assert_eq!(numeric("PID :", "PID", false), None);
    }

    #[test]
    fn test_numeric_hex_without_prefix() {
        assert_eq!(numeric(QC, "TYPE", true), Some(0x20));
        assert_eq!(numeric("STATE : 4  RUNNING", "STATE", true), Some(4));
        assert_eq!(numeric("TYPE : 110 WIN32_OWN_PROCESS", "TYPE", true), Some(0x110));
    }

    #[test]
    fn test_numeric_hex_with_prefix_is_not_prefixed_twice() {
        assert_eq!(numeric("TYPE : 0x10 WIN32_OWN_PROCESS", "TYPE", true), Some(16));
    }

    #[test]
    fn test_numeric_hex_rejects_name_without_code() {
        assert_eq!(numeric("TYPE : FILE_SYSTEM_DRIVER", "TYPE", true), None);
    }

    #[test]
    fn test_prefixed_number() {
        assert_eq!(prefixed_number("CHECKPOINT : 0x7d0", "CHECKPOINT"), Some(2000));
        assert_eq!(prefixed_number("WAIT_HINT : 0x0", "WAIT_HINT"), Some(0));
        assert_eq!(prefixed_number("WAIT_HINT : 30", "WAIT_HINT"), Some(30));
        assert_eq!(prefixed_number("WAIT_HINT :", "WAIT_HINT"), None);
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean("IsLocked : FALSE", "IsLocked"), Some(false));
        assert_eq!(boolean("IsLocked : True", "IsLocked"), Some(true));
        assert_eq!(boolean("IsLocked : maybe", "IsLocked"), None);
    }

    #[test]
    fn test_flag_list() {
        let source = "        STATE              : 4  RUNNING\r\n\
                                (STOPPABLE, NOT_PAUSABLE, ACCEPTS_SHUTDOWN)\r\n\
        WIN32_EXIT_CODE    : 0  (0x0)\r\n";
        assert_eq!(
            flag_list(source, "STATE").unwrap(),
            ["STOPPABLE", "NOT_PAUSABLE", "ACCEPTS_SHUTDOWN"]
        );
        assert_eq!(flag_list("STATE : 1  STOPPED\nWIN32_EXIT_CODE : 0", "STATE"), None);
    }

    #[test]
    fn test_repeated() {
        assert_eq!(repeated(QC, "DEPENDENCIES"), ["rpcss", "Tcpip"]);
        assert!(repeated("DEPENDENCIES       :\nSERVICE_START_NAME : x", "DEPENDENCIES").is_empty());
        assert!(repeated(QC, "MISSING").is_empty());
    }

    #[test]
    fn test_blocks() {
        let source = "Enum: entriesRead = 2\r\n\r\nSERVICE_NAME: a\r\nSTATE : 1\r\n\r\nSERVICE_NAME: b\n\n";
        let found = blocks(source, "SERVICE_NAME");
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("SERVICE_NAME: a"));
        assert!(found[1].starts_with("SERVICE_NAME: b"));
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\r\n  D:(A;;CC;;;SY)\r\n"), Some("D:(A;;CC;;;SY)"));
        assert_eq!(first_line("  \n"), None);
    }
}
