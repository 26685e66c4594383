use crate::records::ProcessRecord;

/// Printed instead of rows when no process matches the filter
pub const NO_TASKS_SENTINEL: &str = "No tasks are running";

fn is_sentinel(output: &str) -> bool {
    output
        .lines()
        .any(|line| line.trim_start().starts_with("INFO:") && line.contains(NO_TASKS_SENTINEL))
}

fn row(line: &str) -> ProcessRecord {
    let line = line.trim();
    let line = line.strip_prefix('"').unwrap_or(line);
    let line = line.strip_suffix('"').unwrap_or(line);
    let mut fields = line.split("\",\"");

    let mut next = || fields.next().unwrap_or_default().to_string();
    let name = next();
    let pid = next();
    let session_name = next();
    let session = next();
    let memory = next();

    ProcessRecord {
        name,
        pid: pid.trim().parse().unwrap_or(0),
        session_name,
        session: session.trim().parse().unwrap_or(0),
        memory,
    }
}

/// Rows of headerless CSV output; the no-tasks sentinel yields no rows
pub fn processes(output: &str) -> Vec<ProcessRecord> {
    if is_sentinel(output) {
        return Vec::new();
    }
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_empty() {
        let output = "INFO: No tasks are running which match the specified criteria.\r\n";
        assert!(processes(output).is_empty());
    }

    #[test]
    fn test_rows() {
        let output = "\"svchost.exe\",\"1234\",\"Services\",\"0\",\"12,345 K\"\r\n\
\"svchost.exe\",\"5678\",\"Services\",\"0\",\"8,120 K\"\r\n\r\n";
        let rows = processes(output);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            ProcessRecord {
                name: "svchost.exe".into(),
                pid: 1234,
                session_name: "Services".into(),
                session: 0,
                memory: "12,345 K".into(),
            }
        );
        assert_eq!(rows[1].pid, 5678);
    }

    #[test]
    fn test_empty_output_is_empty() {
        assert!(processes("").is_empty());
        assert!(processes("\r\n").is_empty());
    }

    #[test]
    fn test_short_row_defaults() {
        let rows = processes("\"odd.exe\"");
        assert_eq!(rows[0].name, "odd.exe");
        assert_eq!(rows[0].pid, 0);
        assert_eq!(rows[0].memory, "");
    }
}
