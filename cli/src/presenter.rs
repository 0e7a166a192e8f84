use crate::EngineHandles;
use chrono::Local;
use loot_core::signal_processor::EngineSignal;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Render engine signals as they arrive. Ticks are counted and a status line
/// is printed every `status_every` ticks (0 disables it).
pub fn spawn(
    mut rx: UnboundedReceiver<EngineSignal>,
    handles: EngineHandles,
    status_every: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks: u32 = 0;
        while let Some(signal) = rx.recv().await {
            match signal {
                EngineSignal::InitializationComplete { unique_items } => {
                    println!("Initialization complete: {unique_items} unique items in bag");
                }
                EngineSignal::DeltasAvailable { .. } => {
                    print_status(&handles);
                }
                EngineSignal::Tick => {
                    ticks = ticks.wrapping_add(1);
                    if status_every > 0 && ticks % status_every == 0 {
                        print_status(&handles);
                    }
                }
            }
        }
    })
}

fn print_status(handles: &EngineHandles) {
    let Ok(stats) = handles.statistics.lock() else {
        return;
    };
    let now = Local::now();
    let map = stats.current_map_stats(now);
    let total = stats.total_stats(now);
    println!(
        "map {} | {:.2} ({:.2}/min) | session {} maps, {} | {:.2} ({:.2}/h)",
        map.formatted_duration(),
        map.income,
        map.income_per_minute(),
        total.map_count,
        total.formatted_duration(),
        total.income,
        total.income_per_hour(),
    );
}
