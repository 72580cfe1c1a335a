//! Scout Funnel — lead-generation wizard driven from the terminal.
//!
//! Loads configuration, wires the lead store and session history into a
//! funnel controller, and reads commands from stdin until the visitor quits.

mod shell;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use funnel_core::config::{AppConfig, StoreBackend};
use funnel_store::build_store;
use funnel_wizard::{
    FunnelController, FunnelSession, OpportunityCounter, SessionHistory, SubmitOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use url::Url;

use crate::shell::{render, Command, HELP};

#[derive(Parser, Debug)]
#[command(name = "scout-funnel")]
#[command(about = "Multi-step lead capture funnel")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "SCOUT_FUNNEL_CONFIG")]
    config: Option<String>,

    /// Built-in funnel profile (overrides config)
    #[arg(long)]
    profile: Option<String>,

    /// Profile definition file (overrides config)
    #[arg(long)]
    profile_file: Option<String>,

    /// Lead store backend: memory or rest (overrides config)
    #[arg(long)]
    store: Option<String>,

    /// Human-readable logs instead of JSON
    #[arg(long, default_value_t = false)]
    plain_logs: bool,
}

fn init_tracing(plain: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scout_funnel=info,funnel_wizard=info,funnel_store=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if plain {
        builder.init();
    } else {
        builder.json().init();
    }
}

/// Loads configuration and applies CLI overrides. A config file named on the
/// command line must load; without one, a broken environment falls back to
/// defaults.
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("failed to load config file '{path}'"))?,
        None => AppConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    if let Some(profile) = &cli.profile {
        config.funnel.profile = profile.clone();
    }
    if let Some(path) = &cli.profile_file {
        config.funnel.profile_file = Some(path.clone());
    }
    if let Some(store) = &cli.store {
        config.store.backend = match store.to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "rest" => StoreBackend::Rest,
            other => anyhow::bail!("unknown store backend '{other}'"),
        };
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.plain_logs);

    info!("Scout funnel starting up");

    let config = load_config(&cli)?;

    let profile = Arc::new(config.resolve_profile()?);
    let store = build_store(&config.store)?;
    let page = Url::parse(&config.funnel.page_url)?;
    let history = Arc::new(SessionHistory::new(page));
    let counter = Arc::new(OpportunityCounter::new(
        config.funnel.counter.start,
        config.funnel.counter.max_increment,
    ));

    info!(
        profile = %profile.name,
        store = store.name(),
        page_url = %config.funnel.page_url,
        "Configuration loaded"
    );

    let controller = Arc::new(
        FunnelController::new(profile.clone(), store, history.clone()).with_counter(counter),
    );
    let session = FunnelSession::start(
        controller.clone(),
        Duration::from_millis(config.funnel.counter.interval_ms),
    );

    println!("{}", render(&controller.view(), &controller.draft(), &profile));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if let Err(e) = command.ensure_offered(&profile) {
            println!("{e}");
            continue;
        }

        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Json => {
                println!("{}", serde_json::to_string_pretty(&controller.view())?);
                continue;
            }
            Command::Show => {}
            Command::Next => {
                if let Err(reason) = controller.next() {
                    println!("Can't continue yet: {reason}");
                }
            }
            Command::Back => {
                if history.back().is_none() {
                    println!("Nothing to go back to");
                }
            }
            Command::Forward => {
                if history.forward().is_none() {
                    println!("Nothing to go forward to");
                }
            }
            Command::Challenge(tag) => controller.toggle_challenge(tag),
            Command::Campaign(tag) => controller.toggle_campaign(tag),
            Command::Set(update) => controller.set_field(update),
            Command::Dismiss => {
                controller.dismiss_notice();
            }
            Command::Submit => match controller.submit().await {
                SubmitOutcome::Submitted => info!("Lead submitted"),
                SubmitOutcome::AlreadyInFlight => println!("Still submitting..."),
                SubmitOutcome::AlreadySubmitted => println!("Already submitted, thanks!"),
                SubmitOutcome::Incomplete(missing) => {
                    let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                    println!("Please fill in: {}", names.join(", "));
                }
                SubmitOutcome::Failed(notice) => error!(%notice, "Submission failed"),
            },
        }

        // Let the history observer catch up before rendering.
        tokio::task::yield_now().await;
        println!("{}", render(&controller.view(), &controller.draft(), &profile));
    }

    session.close().await;
    info!("Scout funnel shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_broken_config_file_is_fatal() {
        let path = write_config(
            "scout-funnel-broken",
            r#"
[store]
backend = "rest"
timeout_ms = "ten"
"#,
        );
        let cli =
            Cli::try_parse_from(["scout-funnel", "--config", path.to_str().unwrap()]).unwrap();
        let result = load_config(&cli);
        std::fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("timeout_ms"));
    }

    #[test]
    fn test_missing_config_file_is_fatal() {
        let cli =
            Cli::try_parse_from(["scout-funnel", "--config", "/nonexistent/scout-funnel.toml"])
                .unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let path = write_config(
            "scout-funnel-overrides",
            r#"
[funnel]
profile = "scout"

[store]
backend = "memory"
"#,
        );
        let cli = Cli::try_parse_from([
            "scout-funnel",
            "--config",
            path.to_str().unwrap(),
            "--profile",
            "scout-lite",
            "--store",
            "REST",
        ])
        .unwrap();
        let result = load_config(&cli);
        std::fs::remove_file(&path).ok();

        let config = result.unwrap();
        assert_eq!(config.funnel.profile, "scout-lite");
        assert_eq!(config.store.backend, StoreBackend::Rest);
    }

    #[test]
    fn test_unknown_store_backend() {
        let cli = Cli::try_parse_from(["scout-funnel", "--store", "sqlite"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
