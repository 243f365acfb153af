// src/commands.rs
//! Command line surface and the non-interactive subcommands.

use std::path::PathBuf;
use clap::{Arg, ArgMatches, Command};

use crate::backend::{BackendClient, ChatServiceStatus, Integration, NotionAccount};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::log_info;

pub fn cli() -> Command {
    Command::new("notion-chat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Chat with your Notion workspace from the terminal")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to a YAML config file"),
        )
        .arg(
            Arg::new("backend-url")
                .long("backend-url")
                .global(true)
                .help("Backend base URL, e.g. http://127.0.0.1:8000"),
        )
        .arg(
            Arg::new("user-id")
                .long("user-id")
                .global(true)
                .help("User id sent with chat and integration requests"),
        )
        .subcommand(Command::new("chat").about("Open the interactive chat (default)"))
        .subcommand(
            Command::new("page")
                .about("Print the full content of a source page")
                .arg(Arg::new("id").required(true).help("Page id")),
        )
        .subcommand(
            Command::new("integrations")
                .about("Manage connected integrations")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List integrations for the user"))
                .subcommand(
                    Command::new("delete")
                        .about("Delete an integration")
                        .arg(Arg::new("id").required(true).help("Integration id")),
                ),
        )
        .subcommand(Command::new("accounts").about("List connected Notion accounts"))
        .subcommand(Command::new("status").about("Check that the chat service is reachable"))
}

/// Resolves the effective configuration: file, environment, then flags.
pub fn load_config(matches: &ArgMatches) -> Result<ClientConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let config = ClientConfig::load(path.map(PathBuf::as_path))?;

    Ok(config.with_overrides(
        matches.get_one::<String>("backend-url").cloned(),
        matches.get_one::<String>("user-id").cloned(),
    ))
}

pub async fn page(config: &ClientConfig, page_id: &str) -> Result<String> {
    let backend = BackendClient::from_config(config)?;
    backend.page_content(page_id).await
}

pub async fn list_integrations(config: &ClientConfig) -> Result<String> {
    let user_id = config.require_user_id()?;
    let backend = BackendClient::from_config(config)?;
    let integrations = backend.list_integrations(&user_id).await?;
    Ok(format_integrations(&integrations))
}

pub async fn delete_integration(config: &ClientConfig, integration_id: &str) -> Result<String> {
    let backend = BackendClient::from_config(config)?;
    backend.delete_integration(integration_id).await?;
    log_info!("Deleted integration {}", integration_id);
    Ok(format!("Deleted integration {}", integration_id))
}

pub async fn accounts(config: &ClientConfig) -> Result<String> {
    let user_id = config.require_user_id()?;
    let backend = BackendClient::from_config(config)?;
    let accounts = backend.list_notion_accounts(&user_id).await?;
    Ok(format_accounts(&accounts))
}

pub async fn status(config: &ClientConfig) -> Result<String> {
    let backend = BackendClient::from_config(config)?;
    let status = backend.chat_status().await?;
    Ok(format_status(&status))
}

pub fn format_integrations(integrations: &[Integration]) -> String {
    if integrations.is_empty() {
        return "No integrations connected".to_string();
    }

    integrations
        .iter()
        .map(|i| format!("{}  {}  account={}  created={}", i.id, i.app_name, i.account_id, i.created_at))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_accounts(accounts: &[NotionAccount]) -> String {
    if accounts.is_empty() {
        return "No Notion accounts connected".to_string();
    }

    accounts
        .iter()
        .map(|a| format!("{}  {}  created={}", a.account_id, a.app_name, a.created_at))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_status(status: &ChatServiceStatus) -> String {
    if status.websocket_path.is_empty() {
        status.message.clone()
    } else {
        format!("{} (websocket: {})", status.message, status.websocket_path)
    }
}
