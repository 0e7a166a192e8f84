use crate::{CliContext, EngineHandles, presenter};
use chrono::Local;
use loot_core::catalog::{JsonCatalogStore, PriceCatalog};
use loot_core::context::{AppConfig, LogMonitor, MonitorCommand, MonitorSettings, TrackingSession};
use loot_core::game_data::ItemCategory;
use loot_core::game_log::{ItemId, LogTail, read_log_chunks};
use loot_core::inventory::ReconcilerState;
use loot_core::signal_processor::ChannelSignalHandler;
use loot_core::stats::{DropLog, SessionStatistics, format_unit_price};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;

const REPLAY_LINES_PER_CHUNK: usize = 500;

fn open_catalog(config: &AppConfig) -> Result<PriceCatalog, String> {
    let mut store = JsonCatalogStore::new(&config.catalog_path);
    let en_table = config.catalog_path.with_file_name("en_id_table.json");
    if let Err(e) = store.initialize_from_en_table(&en_table) {
        tracing::warn!(error = %e, "Failed to seed catalog");
    }
    PriceCatalog::open(store, config.price_throttle_secs).map_err(|e| e.to_string())
}

fn build_session(config: &AppConfig, audit: bool) -> Result<TrackingSession, String> {
    let catalog = open_catalog(config)?;
    let mut stats = SessionStatistics::new(config.tax_enabled, Local::now());
    if audit {
        stats = stats.with_audit(DropLog::new(&config.drop_log_path));
    }
    stats.set_excluded(config.excluded_items.iter().cloned());
    Ok(TrackingSession::new(stats, catalog))
}

fn handles_of(session: &TrackingSession) -> EngineHandles {
    EngineHandles {
        reconciler: session.reconciler(),
        statistics: session.statistics(),
        catalog: session.catalog(),
    }
}

/// Start tailing the game log in the background.
pub async fn watch(ctx: &CliContext, path: Option<String>, status_every: u32) -> Result<(), String> {
    let mut tasks = ctx.tasks.lock().await;
    if tasks.monitor.as_ref().is_some_and(|m| m.is_running()) {
        println!("Already watching. Use `stop` first.");
        return Ok(());
    }

    let config = ctx.config.read().await.clone();
    let log_path = match path.map(PathBuf::from).or(config.log_path.clone()) {
        Some(p) => p,
        None => return Err("No log path configured. Use `watch --path <UE_game.log>`.".to_string()),
    };

    let mut session = build_session(&config, true)?;
    let (tx, rx) = mpsc::unbounded_channel();
    session.add_signal_handler(Box::new(ChannelSignalHandler::new(tx)));
    let handles = handles_of(&session);

    let settings = MonitorSettings {
        poll_interval: config.poll_interval(),
        reopen_interval: config.reopen_interval(),
    };
    let monitor = LogMonitor::spawn(LogTail::new(&log_path), session, settings)
        .map_err(|e| e.to_string())?;

    tasks.presenter = Some(presenter::spawn(rx, handles.clone(), status_every));
    tasks.monitor = Some(monitor);
    drop(tasks);
    ctx.set_engine(handles).await;

    println!("Watching {}", log_path.display());
    println!("Run `init`, then sort your bag in game to set the baseline.");
    Ok(())
}

pub async fn stop(ctx: &CliContext) -> Result<(), String> {
    ctx.tasks.lock().await.stop_all()?;
    println!("Stopped");
    Ok(())
}

async fn send(ctx: &CliContext, command: MonitorCommand) -> Result<(), String> {
    let tasks = ctx.tasks.lock().await;
    match tasks.monitor.as_ref() {
        Some(monitor) if monitor.send(command) => Ok(()),
        _ => Err("Not watching a log. Use `watch` first.".to_string()),
    }
}

pub async fn start_initialization(ctx: &CliContext) -> Result<(), String> {
    if let Some(handles) = ctx.engine().await
        && let Ok(reconciler) = handles.reconciler.lock()
        && reconciler.is_awaiting_init()
    {
        println!("Initialization already in progress: sort your bag in game.");
        return Ok(());
    }
    send(ctx, MonitorCommand::StartInitialization).await?;
    println!("Waiting for bag sort: use the sort button in your bag now.");
    Ok(())
}

pub async fn reset(ctx: &CliContext) -> Result<(), String> {
    send(ctx, MonitorCommand::Reset).await?;
    println!("Statistics and bag state reset. Run `init` again.");
    Ok(())
}

pub async fn reload_catalog(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await.clone();
    let catalog = open_catalog(&config)?;
    let items = catalog.len();
    send(ctx, MonitorCommand::ReloadCatalog(catalog)).await?;
    println!("Reloading catalog ({items} items)");
    Ok(())
}

fn parse_category(name: &str) -> Option<ItemCategory> {
    let wanted = name.to_lowercase();
    ItemCategory::ALL.into_iter().find(|category| {
        category.label().to_lowercase() == wanted || format!("{category:?}").to_lowercase() == wanted
    })
}

pub async fn show_stats(ctx: &CliContext, category: Option<&str>) -> Result<(), String> {
    let handles = ctx.engine().await.ok_or("No active session")?;
    let categories = match category {
        Some(name) => vec![parse_category(name).ok_or(format!("Unknown category '{name}'"))?],
        None => Vec::new(),
    };

    let now = Local::now();
    let (map, total) = {
        let stats = handles.statistics.lock().map_err(|e| e.to_string())?;
        (stats.current_map_stats(now), stats.total_stats(now))
    };
    let catalog = handles.catalog.lock().map_err(|e| e.to_string())?;

    let (map_drops, total_drops) = if categories.is_empty() {
        (
            map.drops.iter().map(|(id, qty)| (*id, *qty)).collect(),
            total.drops.iter().map(|(id, qty)| (*id, *qty)).collect(),
        )
    } else {
        (
            map.drops_in(&catalog, &categories),
            total.drops_in(&catalog, &categories),
        )
    };

    let state = if map.active { "in map" } else { "idle" };
    println!(
        "Current map ({state}): {} | income {:.2} | {:.2}/min",
        map.formatted_duration(),
        map.income,
        map.income_per_minute()
    );
    print_drops(&map_drops, &catalog, now.timestamp());

    println!(
        "Session: {} maps | {} | income {:.2} | {:.2}/min | {:.2}/h",
        total.map_count,
        total.formatted_duration(),
        total.income,
        total.income_per_minute(),
        total.income_per_hour()
    );
    print_drops(&total_drops, &catalog, now.timestamp());
    Ok(())
}

fn print_drops(drops: &[(ItemId, i64)], catalog: &PriceCatalog, now: i64) {
    if drops.is_empty() {
        println!("  (no drops)");
        return;
    }
    for (id, qty) in drops {
        match catalog.get(*id) {
            Some(record) => println!(
                "  {} {:<40} x{:<6} {}/each",
                record.freshness(now).glyph(),
                record.name,
                qty,
                format_unit_price(record.price)
            ),
            None => println!("  ? {:<40} x{}", format!("Unknown item (ID: {id})"), qty),
        }
    }
}

pub async fn show_bag(ctx: &CliContext) -> Result<(), String> {
    let handles = ctx.engine().await.ok_or("No active session")?;
    let (state, summary, changes) = {
        let reconciler = handles.reconciler.lock().map_err(|e| e.to_string())?;
        (reconciler.state(), reconciler.bag_summary(), reconciler.map_net_changes())
    };
    let catalog = handles.catalog.lock().map_err(|e| e.to_string())?;

    let state = match state {
        ReconcilerState::Uninitialized => "not initialized",
        ReconcilerState::AwaitingBulkInit => "waiting for bag sort",
        ReconcilerState::Ready(_) => "ready",
    };
    println!("Bag ({state}), {} items", summary.len());
    for (id, qty) in &summary {
        let name = catalog.get(*id).map(|r| r.name.as_str()).unwrap_or("?");
        println!("  {id:>10} {name:<40} {qty}");
    }
    if !changes.is_empty() {
        println!("Changes since map entry:");
        for delta in &changes {
            println!("  {:>10} {:+}", delta.item_id, delta.change);
        }
    }
    Ok(())
}

pub async fn show_pending(ctx: &CliContext) -> Result<(), String> {
    let handles = ctx.engine().await.ok_or("No active session")?;
    let pending = handles
        .statistics
        .lock()
        .map_err(|e| e.to_string())?
        .pending();
    if pending.is_empty() {
        println!("No pending items");
    }
    for (id, qty) in pending {
        println!("  Unknown item (ID: {id}) x{qty}");
    }
    Ok(())
}

/// Run the whole pipeline once over a complete log file.
pub async fn replay(ctx: &CliContext, path: &str, sorted: bool) -> Result<(), String> {
    let config = ctx.config.read().await.clone();
    let mut session = build_session(&config, false)?;
    if sorted {
        session.start_initialization();
    }
    let path = PathBuf::from(path);
    let timer = Instant::now();

    let session = tokio::task::spawn_blocking(move || -> Result<TrackingSession, String> {
        let chunks = read_log_chunks(&path, REPLAY_LINES_PER_CHUNK).map_err(|e| e.to_string())?;
        for chunk in &chunks {
            session.process_chunk(chunk, Local::now());
        }
        Ok(session)
    })
    .await
    .map_err(|e| e.to_string())??;

    println!("Replayed in {}ms", timer.elapsed().as_millis());

    let handles = handles_of(&session);
    let watching = ctx.tasks.lock().await.monitor.is_some();
    if !watching {
        ctx.set_engine(handles.clone()).await;
    }

    let total = handles
        .statistics
        .lock()
        .map_err(|e| e.to_string())?
        .total_stats(Local::now());
    println!("Maps: {} | income {:.2}", total.map_count, total.income);
    let catalog = handles.catalog.lock().map_err(|e| e.to_string())?;
    let drops: Vec<(ItemId, i64)> = total.drops.into_iter().collect();
    print_drops(&drops, &catalog, Local::now().timestamp());
    Ok(())
}

pub async fn show_config(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    if let Ok(path) = AppConfig::config_file_path() {
        println!("Config file: {}", path.display());
    }
    println!("{config:#?}");
    Ok(())
}

pub async fn set_log(ctx: &CliContext, path: &str) -> Result<(), String> {
    let path = PathBuf::from(path);
    if !path.is_file() {
        return Err(format!("{} is not a file", path.display()));
    }
    let mut config = ctx.config.write().await;
    config.log_path = Some(path);
    config.save().map_err(|e| e.to_string())?;
    println!("Log path saved");
    Ok(())
}

pub async fn set_tax(ctx: &CliContext, enabled: bool) -> Result<(), String> {
    {
        let mut config = ctx.config.write().await;
        config.tax_enabled = enabled;
        config.save().map_err(|e| e.to_string())?;
    }
    if let Some(handles) = ctx.engine().await
        && let Ok(mut stats) = handles.statistics.lock()
    {
        stats.set_tax_enabled(enabled);
    }
    println!("Tax {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

pub fn exit() -> Result<(), String> {
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_names() {
        assert_eq!(parse_category("currency"), Some(ItemCategory::Currency));
        assert_eq!(parse_category("Memory Glow"), Some(ItemCategory::Glow));
        assert_eq!(parse_category("glow"), Some(ItemCategory::Glow));
        assert_eq!(parse_category("weapons"), None);
    }
}
