//! CLI entry point for console-api.

mod cli;
mod render;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use console_api::api::ApiClient;
use console_api::build_info::cli_version_text;
use console_api::cancel::CancelHandle;
use console_api::config::load_config_with_diagnostics;
use console_api::context::AppContext;
use console_api::links::HrefOptions;
use console_api::types::{ApiResponse, Params, UploadFile};
use render::Renderer;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Env var holding the `tracing` filter directive.
const LOG_ENV_VAR: &str = "CONSOLE_API_LOG";
/// Conventional exit status after an interrupt.
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing();

    if args.version {
        println!("{}", cli_version_text());
        return;
    }

    let renderer = Renderer::new(!args.no_color);
    let Some(command) = args.command else {
        renderer.error("no command given; run `console-api --help` for usage.");
        std::process::exit(2);
    };

    let loaded = match load_config_with_diagnostics(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };
    for warning in &loaded.diagnostics.warnings {
        renderer.warn(warning);
    }
    let config = loaded.config;

    let context = match AppContext::from_config(&config) {
        Ok(context) => Arc::new(context),
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };
    if let Some(org) = args.org {
        context.auth.set_org_id(org);
    }
    context
        .hooks
        .register(move |message| renderer.notification(message));

    let client = ApiClient::new_with_retry_policy(
        Arc::clone(&context),
        config.network.timeout(),
        config.retry.policy(),
    );

    let handle = CancelHandle::new();
    let interrupt = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    match run(command, &client, &handle, renderer).await {
        Ok(Completion::Done) => {}
        Ok(Completion::Cancelled) => {
            renderer.warn("request cancelled");
            std::process::exit(EXIT_CANCELLED);
        }
        Err(msg) => {
            renderer.error(&msg);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, PartialEq, Eq)]
enum Completion {
    Done,
    Cancelled,
}

async fn run(
    command: cli::Command,
    client: &ApiClient,
    handle: &CancelHandle,
    renderer: Renderer,
) -> Result<Completion, String> {
    let outcome = match command {
        cli::Command::Get { path, params } => {
            let params = parse_param_pairs(&params)?;
            client.get(&path, &params, Some(handle)).await
        }
        cli::Command::Delete { path, params } => {
            let params = parse_param_pairs(&params)?;
            client.delete(&path, &params, Some(handle)).await
        }
        cli::Command::Post { path, json } => {
            let params = parse_json_object(json.as_deref())?;
            client.post(&path, &params, Some(handle)).await
        }
        cli::Command::Upload { path, files, json } => {
            let params = parse_json_object(json.as_deref())?;
            let files = load_upload_files(&files).await?;
            client.upload(&path, &files, &params, Some(handle)).await
        }
        cli::Command::Blob { path, params, out } => {
            let params = parse_param_pairs(&params)?;
            return download_blob(client, &path, &params, &out, handle, renderer).await;
        }
        cli::Command::Href {
            target,
            params,
            internal,
        } => {
            let params = parse_param_pairs(&params)?;
            let options = if internal {
                HrefOptions::internal()
            } else {
                HrefOptions::default()
            };
            println!("{}", client.context().href(target.as_str(), &params, options));
            return Ok(Completion::Done);
        }
    };

    // Terminal failures were already printed by the registered hook.
    let response = outcome.map_err(|e| format!("request failed: {e}"))?;
    print_response(&response)
}

fn print_response(response: &ApiResponse) -> Result<Completion, String> {
    if response.cancelled {
        return Ok(Completion::Cancelled);
    }
    let text = match &response.data {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => serde_json::to_string_pretty(other)
            .map_err(|e| format!("failed to render response: {e}"))?,
    };
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(Completion::Done)
}

async fn download_blob(
    client: &ApiClient,
    path: &str,
    params: &Params,
    out: &str,
    handle: &CancelHandle,
    renderer: Renderer,
) -> Result<Completion, String> {
    let blob = match client.get_blob(path, params, Some(handle)).await {
        Ok(blob) => blob,
        Err(failure) => {
            failure.report_error();
            return Err(failure.to_string());
        }
    };
    if blob.cancelled {
        return Ok(Completion::Cancelled);
    }
    tokio::fs::write(out, &blob.data)
        .await
        .map_err(|e| format!("failed to write {out}: {e}"))?;
    renderer.detail("wrote", &format!("{} bytes to {out}", blob.data.len()));
    if let Some(content_type) = blob.content_type.as_deref() {
        renderer.detail("content-type", content_type);
    }
    Ok(Completion::Done)
}

/// `key=value` pairs into parameters; a repeated key becomes a list.
fn parse_param_pairs(pairs: &[String]) -> Result<Params, String> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("parameter `{pair}` must look like key=value"))?;
        if key.is_empty() {
            return Err(format!("parameter `{pair}` has an empty key"));
        }
        let value = Value::String(value.to_string());
        match params.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.to_string(), value);
            }
        }
    }
    Ok(params)
}

fn parse_json_object(text: Option<&str>) -> Result<Params, String> {
    let Some(text) = text else {
        return Ok(Params::new());
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("--json must be a JSON object".to_string()),
        Err(e) => Err(format!("--json is not valid JSON: {e}")),
    }
}

async fn load_upload_files(specs: &[String]) -> Result<BTreeMap<String, UploadFile>, String> {
    let mut files = BTreeMap::new();
    for entry in specs {
        let (key, file_path) = entry
            .split_once('=')
            .ok_or_else(|| format!("file `{entry}` must look like key=PATH"))?;
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| format!("failed to read {file_path}: {e}"))?;
        let file_name = Path::new(file_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.to_string());
        files.insert(key.to_string(), UploadFile::new(file_name, bytes));
    }
    Ok(files)
}
