//! OpsDesk admin CLI.
//!
//! # Responsibility
//! - Drive the resource endpoint against the configured database.
//! - Print every response as JSON; exit with status 1 on any non-success.

use clap::{Parser, Subcommand};
use log::info;
use opsdesk_api::{Action, Api, ApiConfig, ApiRequest};
use opsdesk_core::{
    core_version, init_logging_from_config, open_pool, ping, KindConfig, KIND_CONFIGS,
};
use serde_json::{json, Value};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "opsdesk", version)]
#[command(about = "OpsDesk resource administration CLI")]
struct Cli {
    /// Bearer token presented to the endpoint
    #[arg(long, env = "OPSDESK_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Health check; does not touch the database
    Ping,
    /// List configured resource kinds with their list policy
    Kinds,
    /// List records of a kind, newest first
    List { kind: String },
    /// Show one record
    Get { kind: String, id: String },
    /// Create a record from a JSON object (or `@path` to read a file)
    Create { kind: String, body: String },
    /// Merge a JSON object into an existing record
    Update {
        kind: String,
        id: String,
        body: String,
    },
    /// Delete a record
    Delete { kind: String, id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let (kind, action) = match cli.command {
        Commands::Ping => {
            print_json(&json!({ "ping": ping(), "version": core_version() }))?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Kinds => {
            let kinds = KIND_CONFIGS.iter().map(kind_summary).collect();
            print_json(&Value::Array(kinds))?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::List { kind } => (kind, Action::List),
        Commands::Get { kind, id } => (kind, Action::Get(id)),
        Commands::Create { kind, body } => (kind, Action::Create(read_body(&body)?)),
        Commands::Update { kind, id, body } => (kind, Action::Update(id, read_body(&body)?)),
        Commands::Delete { kind, id } => (kind, Action::Remove(id)),
    };

    let config = ApiConfig::from_env().map_err(|err| format!("invalid configuration: {err}"))?;
    init_logging_from_config(&config.core).map_err(|err| format!("logging init failed: {err}"))?;
    let pool = open_pool(&config.core).map_err(|err| format!("database open failed: {err}"))?;
    let api = Api::new(pool, config.authenticator());

    info!(
        "event=cli_request module=cli status=start kind={} action={}",
        kind,
        action.name()
    );
    let authorization = cli.token.map(|token| format!("Bearer {token}"));
    let response = api.handle(ApiRequest::new(authorization, kind, action));
    let rendered =
        serde_json::to_value(&response).map_err(|err| format!("response encoding failed: {err}"))?;
    print_json(&rendered)?;

    if response.status.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn read_body(raw: &str) -> Result<Value, String> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("cannot read body file `{path}`: {err}"))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).map_err(|err| format!("body is not valid JSON: {err}"))
}

fn kind_summary(config: &KindConfig) -> Value {
    json!({
        "name": config.name,
        "table": config.table,
        "pageCap": config.page_cap.limit(),
        "orderBy": config.order_by.column(),
        "parent": config.parent.map(|parent| json!({
            "relation": parent.relation,
            "kind": parent.kind,
        })),
    })
}

fn print_json(value: &Value) -> Result<(), String> {
    let text =
        serde_json::to_string_pretty(value).map_err(|err| format!("output encoding failed: {err}"))?;
    println!("{text}");
    Ok(())
}
