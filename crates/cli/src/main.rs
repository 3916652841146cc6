//! Meta-AI CLI application: a thin `reqwest` client over the Control
//! API, for operators who'd rather not curl `/status` and `/tasks/submit`
//! by hand.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use meta_ai_common::Config;
use serde_json::{json, Value};

fn cli() -> Command {
    Command::new("meta-ai-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Meta-AI Team")
        .about("Meta-AI Orchestrator CLI")
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("BASE_URL")
                .help("Control API base URL (defaults to http://<configured host>:<port>)"),
        )
        .subcommand(Command::new("status").about("Show orchestrator status"))
        .subcommand(Command::new("agents").about("List registered agents"))
        .subcommand(
            Command::new("task")
                .about("Task management")
                .subcommand(Command::new("list").about("Summarize tasks by status"))
                .subcommand(
                    Command::new("submit")
                        .about("Submit a new task")
                        .arg(Arg::new("description").required(true).help("Task prompt"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("general")
                                .help("Task type, e.g. code_generation"),
                        )
                        .arg(
                            Arg::new("priority")
                                .long("priority")
                                .default_value("medium")
                                .help("low | medium | high | critical"),
                        ),
                )
                .subcommand(
                    Command::new("get")
                        .about("Fetch one task by id")
                        .arg(Arg::new("task_id").required(true)),
                ),
        )
}

/// Resolve the Control API's base URL: an explicit `--url` wins, otherwise
/// fall back to the same config the server itself loads from, so the CLI
/// points at the right place with zero flags in the common case.
fn base_url(matches: &clap::ArgMatches) -> Result<String> {
    if let Some(url) = matches.get_one::<String>("url") {
        return Ok(url.trim_end_matches('/').to_string());
    }
    let config = Config::load().context("failed to load configuration")?;
    let host = if config.server.host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        &config.server.host
    };
    Ok(format!("http://{host}:{}", config.server.port))
}

async fn get(client: &reqwest::Client, url: &str) -> Result<Value> {
    let response = client.get(url).send().await.with_context(|| format!("GET {url} failed"))?;
    let status = response.status();
    let body: Value = response.json().await.context("response was not valid JSON")?;
    if !status.is_success() {
        anyhow::bail!("{status}: {body}");
    }
    Ok(body)
}

async fn post(client: &reqwest::Client, url: &str, body: Value) -> Result<Value> {
    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("POST {url} failed"))?;
    let status = response.status();
    let body: Value = response.json().await.context("response was not valid JSON")?;
    if !status.is_success() {
        anyhow::bail!("{status}: {body}");
    }
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let base = base_url(&matches)?;
    let client = reqwest::Client::new();

    match matches.subcommand() {
        Some(("status", _)) => {
            let status = get(&client, &format!("{base}/status")).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Some(("agents", _)) => {
            let agents = get(&client, &format!("{base}/agents")).await?;
            println!("{}", serde_json::to_string_pretty(&agents)?);
        }
        Some(("task", task_matches)) => match task_matches.subcommand() {
            Some(("list", _)) => {
                let tasks = get(&client, &format!("{base}/tasks")).await?;
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            }
            Some(("get", get_matches)) => {
                let task_id = get_matches.get_one::<String>("task_id").unwrap();
                let task = get(&client, &format!("{base}/tasks/{task_id}")).await?;
                println!("{}", serde_json::to_string_pretty(&task)?);
            }
            Some(("submit", submit_matches)) => {
                let description = submit_matches.get_one::<String>("description").unwrap();
                let task_type = submit_matches.get_one::<String>("type").unwrap();
                let priority = submit_matches.get_one::<String>("priority").unwrap();
                let response = post(
                    &client,
                    &format!("{base}/tasks/submit"),
                    json!({
                        "task_type": task_type,
                        "prompt": description,
                        "priority": priority,
                    }),
                )
                .await?;
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            _ => println!("Use 'task list', 'task get <task_id>' or 'task submit <description>'"),
        },
        _ => {
            cli().print_help()?;
            println!();
        }
    }

    Ok(())
}
