use std::fs::File;
use std::sync::Mutex;
use clap::ArgMatches;
use color_eyre::eyre::WrapErr;
use tracing::Level;

use notion_chat_client::app::App;
use notion_chat_client::commands;
use notion_chat_client::config::ClientConfig;
use notion_chat_client::session::ChatSession;
use notion_chat_client::util::log::init_logger;
use notion_chat_client::{log_error, log_info};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let matches = commands::cli().get_matches();
    let config = commands::load_config(&matches)?;

    init_logger(&config.log_dir, config.debug)
        .wrap_err_with(|| format!("cannot open log directory {}", config.log_dir.display()))?;
    init_tracing(&config)?;
    log_info!("Starting notion-chat against {}", config.backend_url);

    let result = dispatch(&matches, &config).await;
    if let Err(e) = &result {
        log_error!("notion-chat failed: {:#}", e);
    }
    result
}

async fn dispatch(matches: &ArgMatches, config: &ClientConfig) -> color_eyre::Result<()> {
    let output = match matches.subcommand() {
        None | Some(("chat", _)) => return run_chat(config).await,
        Some(("page", args)) => {
            let id = args.get_one::<String>("id").map(String::as_str).unwrap_or_default();
            commands::page(config, id).await?
        }
        Some(("integrations", args)) => match args.subcommand() {
            Some(("delete", delete)) => {
                let id = delete.get_one::<String>("id").map(String::as_str).unwrap_or_default();
                commands::delete_integration(config, id).await?
            }
            _ => commands::list_integrations(config).await?,
        },
        Some(("accounts", _)) => commands::accounts(config).await?,
        Some(("status", _)) => commands::status(config).await?,
        Some((other, _)) => color_eyre::eyre::bail!("unknown command '{}'", other),
    };

    println!("{}", output);
    Ok(())
}

async fn run_chat(config: &ClientConfig) -> color_eyre::Result<()> {
    let user_id = config.require_user_id()?;
    let session = ChatSession::connect(config, &user_id)?;

    let terminal = ratatui::init();
    let result = App::new(session).run(terminal).await;
    ratatui::restore();
    result
}

/// Dependency diagnostics go to a file so they never draw over the terminal UI.
fn init_tracing(config: &ClientConfig) -> color_eyre::Result<()> {
    let path = config.log_dir.join("trace.log");
    let file = File::create(&path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
    let level = if config.debug { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}
