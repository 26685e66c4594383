use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use scctl::command::{
    BootRequest, BootStatus, ConfigOptions, ConfigRequest, ControlRequest, ErrorSeverity,
    FailureActions, FailureOptions, FailureRequest, InteractType, QueryOptions, QueryRequest,
    QueryState, ServerRequest, ServiceClass, ServiceRequest, ServiceType, StartType, ValueRequest,
};
use scctl::{ServiceManager, Settings};

#[derive(Parser)]
#[command(name = "scctl")]
#[command(about = "Scriptable front end for the Windows service control tool")]
#[command(version)]
struct Cli {
    /// Remote computer to address
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ControlArgs {
    /// Services to act on
    #[arg(required = true)]
    names: Vec<String>,

    /// Act on services one at a time instead of concurrently
    #[arg(long)]
    serial: bool,

    /// Per-service timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Extra argument passed to each service (repeatable)
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Args)]
struct ConfigArgs {
    name: String,

    #[arg(long = "type", value_enum)]
    service_type: Option<ServiceType>,

    /// Process sharing for an interactive service
    #[arg(long, value_enum)]
    interact: Option<InteractType>,

    #[arg(long, value_enum)]
    start: Option<StartType>,

    #[arg(long, value_enum)]
    error: Option<ErrorSeverity>,

    #[arg(long)]
    binpath: Option<String>,

    #[arg(long)]
    group: Option<String>,

    /// Request a tag within the load order group (true/false)
    #[arg(long)]
    tag: Option<bool>,

    /// Service or group that must start first (repeatable)
    #[arg(long)]
    depend: Vec<String>,

    /// Account the service runs as
    #[arg(long)]
    obj: Option<String>,

    #[arg(long)]
    display_name: Option<String>,

    #[arg(long)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start services and wait until they are running
    Start(ControlArgs),

    /// Stop services and wait until they are stopped
    Stop {
        #[command(flatten)]
        control: ControlArgs,

        /// Wait for the hosting process to exit
        #[arg(long)]
        wait_for_exit: bool,
    },

    /// Pause services and wait until they are paused
    Pause(ControlArgs),

    /// Continue paused services and wait until they are running
    Continue(ControlArgs),

    /// Send a control code to a service
    Control { name: String, code: String },

    /// Ask a service to report its status
    Interrogate { name: String },

    /// Enumerate services
    Query {
        /// Query a single service
        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_enum)]
        class: Option<ServiceClass>,

        #[arg(long = "type", value_enum)]
        service_type: Option<ServiceType>,

        #[arg(long, value_enum)]
        state: Option<QueryState>,

        #[arg(long)]
        group: Option<String>,
    },

    /// Create a service
    Create(ConfigArgs),

    /// Change a service's configuration
    SetConfig(ConfigArgs),

    /// Show a service's configuration
    Config { name: String },

    /// Show a service's failure actions
    Failure { name: String },

    /// Change a service's failure actions
    SetFailure {
        name: String,

        /// Seconds without failure before the failure count resets
        #[arg(long)]
        reset: Option<u64>,

        #[arg(long)]
        reboot_message: Option<String>,

        /// Command to run on failure
        #[arg(long = "command")]
        command_line: Option<String>,

        #[arg(long)]
        restart_ms: Option<u64>,

        #[arg(long)]
        run_ms: Option<u64>,

        #[arg(long)]
        reboot_ms: Option<u64>,
    },

    /// List services that depend on a service
    Dependencies { name: String },

    /// Show a service's description
    Description { name: String },

    /// Set a service's description
    SetDescription { name: String, description: String },

    /// Show a service's display name
    DisplayName { name: String },

    /// Find the service name for a display name
    KeyName { display_name: String },

    /// Show a service's security descriptor
    Descriptor { name: String },

    /// Set a service's security descriptor (SDDL)
    SetDescriptor { name: String, descriptor: String },

    /// Delete a service
    Delete { name: String },

    /// Mark the last boot as good or bad
    SetBoot {
        #[arg(value_enum)]
        status: BootStatus,
    },

    /// Lock the service database
    Lock,

    /// Show the service database lock status
    LockStatus,
}

fn control_request(server: &Option<String>, args: ControlArgs) -> ControlRequest {
    let mut request = ControlRequest::new(args.names).args(args.args);
    request.server = server.clone();
    request.options.serial = args.serial;
    request.options.timeout = args.timeout_ms;
    request
}

fn config_request(server: &Option<String>, args: ConfigArgs) -> ConfigRequest {
    let options = ConfigOptions {
        service_type: args.service_type,
        interact: args.interact,
        start: args.start,
        error: args.error,
        binpath: args.binpath,
        group: args.group,
        tag: args.tag,
        depend: args.depend,
        obj: args.obj,
        displayname: args.display_name,
        password: args.password,
    };
    ConfigRequest {
        server: server.clone(),
        service: args.name,
        options,
    }
}

fn service_request(server: &Option<String>, name: String) -> ServiceRequest {
    ServiceRequest {
        server: server.clone(),
        service: name,
    }
}

fn value_request(server: &Option<String>, name: String, value: String) -> ValueRequest {
    ValueRequest {
        server: server.clone(),
        service: name,
        value,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let manager = ServiceManager::new(Settings::load()?);
    let server = cli.server;

    match cli.command {
        Commands::Start(args) => {
            let reports = manager.start(&control_request(&server, args)).await?;
            println!("Started {} service(s)", reports.len());
        }
        Commands::Stop {
            control,
            wait_for_exit,
        } => {
            let mut request = control_request(&server, control);
            request.options.wait_for_exit = wait_for_exit;
            let reports = manager.stop(&request).await?;
            println!("Stopped {} service(s)", reports.len());
        }
        Commands::Pause(args) => {
            let reports = manager.pause(&control_request(&server, args)).await?;
            println!("Paused {} service(s)", reports.len());
        }
        Commands::Continue(args) => {
            let reports = manager.resume(&control_request(&server, args)).await?;
            println!("Continued {} service(s)", reports.len());
        }
        Commands::Control { name, code } => {
            manager.control(&value_request(&server, name, code)).await?;
        }
        Commands::Interrogate { name } => {
            manager.interrogate(&service_request(&server, name)).await?;
        }
        Commands::Query {
            name,
            class,
            service_type,
            state,
            group,
        } => {
            let request = QueryRequest {
                server,
                options: QueryOptions {
                    name,
                    class,
                    service_type,
                    state,
                    group,
                },
            };
            print_json(&manager.query(&request).await?)?;
        }
        Commands::Create(args) => {
            manager.create(&config_request(&server, args)).await?;
            println!("Service created");
        }
        Commands::SetConfig(args) => {
            manager.set_config(&config_request(&server, args)).await?;
            println!("Service configuration updated");
        }
        Commands::Config { name } => {
            print_json(&manager.config(&service_request(&server, name)).await?)?;
        }
        Commands::Failure { name } => {
            print_json(&manager.failure_config(&service_request(&server, name)).await?)?;
        }
        Commands::SetFailure {
            name,
            reset,
            reboot_message,
            command_line,
            restart_ms,
            run_ms,
            reboot_ms,
        } => {
            let request = FailureRequest {
                server,
                service: name,
                options: FailureOptions {
                    reset,
                    reboot: reboot_message,
                    command: command_line,
                    actions: Some(FailureActions {
                        restart: restart_ms,
                        run: run_ms,
                        reboot: reboot_ms,
                    }),
                },
            };
            manager.set_failure_config(&request).await?;
            println!("Failure actions updated");
        }
        Commands::Dependencies { name } => {
            print_json(&manager.dependencies(&service_request(&server, name)).await?)?;
        }
        Commands::Description { name } => {
            println!("{}", manager.description(&service_request(&server, name)).await?);
        }
        Commands::SetDescription { name, description } => {
            manager
                .set_description(&value_request(&server, name, description))
                .await?;
        }
        Commands::DisplayName { name } => {
            println!("{}", manager.display_name(&service_request(&server, name)).await?);
        }
        Commands::KeyName { display_name } => {
            println!("{}", manager.key_name(&service_request(&server, display_name)).await?);
        }
        Commands::Descriptor { name } => {
            println!("{}", manager.descriptor(&service_request(&server, name)).await?);
        }
        Commands::SetDescriptor { name, descriptor } => {
            manager
                .set_descriptor(&value_request(&server, name, descriptor))
                .await?;
        }
        Commands::Delete { name } => {
            manager.delete(&service_request(&server, name)).await?;
            println!("Service deleted");
        }
        Commands::SetBoot { status } => {
            let mut request = BootRequest::new(status);
            request.server = server;
            manager.set_boot(&request).await?;
        }
        Commands::Lock => {
            manager.lock(&ServerRequest { server }).await?;
        }
        Commands::LockStatus => {
            print_json(&manager.lock_status(&ServerRequest { server }).await?)?;
        }
    }

    Ok(())
}
