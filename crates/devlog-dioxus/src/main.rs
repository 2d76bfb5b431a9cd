use std::env;
use std::process;

use anyhow::Context;
use devlog_config::Config;

mod services;
mod ui;

use services::Services;
use ui::App;

const OFFLINE_FLAG: &str = "--offline";

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("devlog starting up!");

    let services = match resolve_services() {
        Ok(services) => services,
        Err(e) => {
            log::error!("Startup failed: {e:#}");
            eprintln!("Error: {e:#}");
            print_usage();
            process::exit(1);
        }
    };

    log::info!("About to launch Dioxus app for desktop");
    dioxus::LaunchBuilder::desktop()
        .with_cfg(make_window_config())
        .with_context(services)
        .launch(App);
}

/// Pick the backends from the command line and config file
fn resolve_services() -> anyhow::Result<Services> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            let config_path = Config::config_path();
            log::info!("Config path: {}", config_path.display());
            let config = Config::load()
                .context("Failed to load config file")?
                .with_context(|| format!("No config file found at {}", config_path.display()))?;
            log::info!("Using backend at {}", config.backend_url);
            Ok(Services::from_config(&config))
        }
        [flag] if flag == OFFLINE_FLAG => {
            log::info!("Running offline with an in-memory store");
            Ok(Services::offline())
        }
        _ => anyhow::bail!("Unexpected arguments: {}", args.join(" ")),
    }
}

fn print_usage() {
    let program_name = env::args().next().unwrap_or_else(|| "devlog".to_string());
    eprintln!("Usage: {program_name} [{OFFLINE_FLAG}]");
    eprintln!(
        "Without {OFFLINE_FLAG}, create a config file at {}",
        Config::config_path().display()
    );
}

fn make_window_config() -> dioxus::desktop::Config {
    use dioxus::desktop::{Config, WindowBuilder};

    let window = WindowBuilder::new()
        .with_title("devlog")
        .with_always_on_top(false);

    Config::default().with_window(window)
}
