use super::{CommandDescription, TASKLIST};

/// Lists the processes hosting `service`, as headerless CSV
pub fn hosting_processes(service: &str, server: Option<&str>) -> CommandDescription {
    let server = server
        .map(|server| server.trim_start_matches('\\'))
        .filter(|server| !server.is_empty());

    let mut args = Vec::new();
    if let Some(server) = server {
        args.push("/s".to_string());
        args.push(server.to_string());
    }
    args.extend([
        "/fi".to_string(),
        format!("SERVICES eq {}", service),
        "/fo".to_string(),
        "csv".to_string(),
        "/nh".to_string(),
    ]);

    CommandDescription::new_raw(TASKLIST, args, server).with_target(service)
}
