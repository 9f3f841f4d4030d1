mod app;
mod commands;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use foldcore_cache::SqliteCache;
use foldcore_config::{default_settings_path, Settings};
use foldcore_shell::SystemShell;
use foldd::SearchCoordinator;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use app::{App, Flow};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings_path = settings_path_from_args().unwrap_or_else(default_settings_path);
    let mut settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    if let Some(root) = root_override_from_args() {
        settings.root_dir = root;
    }

    let cache = Arc::new(
        SqliteCache::open(&settings.cache_path)
            .with_context(|| format!("opening cache {}", settings.cache_path.display()))?,
    );
    tracing::info!(
        root = %settings.root_dir.display(),
        cache = %settings.cache_path.display(),
        "foldfind ready"
    );

    let coordinator = SearchCoordinator::from_settings(&settings, cache.clone());
    let mut app = App::new(coordinator, SystemShell, std::io::stdout());
    println!(
        "searching subfolders of {} (/help for commands)",
        settings.root_dir.display()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(settings.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => app.on_tick()?,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if app.handle_line(&line)? == Flow::Quit {
                    break;
                }
            }
        }
    }

    drop(app);
    match Arc::try_unwrap(cache) {
        Ok(cache) => cache.close()?,
        Err(_) => tracing::debug!("scan worker still holds the cache; leaving it to drop"),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn settings_path_from_args() -> Option<PathBuf> {
    arg_value(env::args(), "--config=")
}

fn root_override_from_args() -> Option<PathBuf> {
    arg_value(env::args(), "--root=")
}

fn arg_value<I>(args: I, prefix: &str) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .filter_map(|arg| arg.strip_prefix(prefix).map(str::to_string))
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}
