use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use crate::catalog::PriceCatalog;
use crate::game_log::{LogChunk, LogTextParser};
use crate::inventory::{InitRequest, InventoryReconciler};
use crate::signal_processor::{EngineSignal, SignalHandler};
use crate::stats::SessionStatistics;

/// What one chunk did to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub prices_updated: usize,
    pub initialized_items: Option<usize>,
    pub entered_map: bool,
    pub exited_map: bool,
    pub deltas: usize,
    pub valued: usize,
}

/// Live tracking state: reconciler, statistics and catalog behind one lock
/// each, plus the signal handlers that observe them.
///
/// Chunks are processed strictly in arrival order. Within one chunk the order
/// is: price quotes, bulk init, map transitions, reconciliation, valuation.
/// The map baseline is reset before reconciliation so the first in-map delta
/// is measured against the map-entry totals.
pub struct TrackingSession {
    parser: LogTextParser,
    reconciler: Arc<Mutex<InventoryReconciler>>,
    statistics: Arc<Mutex<SessionStatistics>>,
    catalog: Arc<Mutex<PriceCatalog>>,
    signal_handlers: Vec<Box<dyn SignalHandler + Send>>,
}

impl TrackingSession {
    pub fn new(statistics: SessionStatistics, catalog: PriceCatalog) -> Self {
        Self {
            parser: LogTextParser::new(),
            reconciler: Arc::new(Mutex::new(InventoryReconciler::new())),
            statistics: Arc::new(Mutex::new(statistics)),
            catalog: Arc::new(Mutex::new(catalog)),
            signal_handlers: Vec::new(),
        }
    }

    /// Register a signal handler to receive engine signals
    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler + Send>) {
        self.signal_handlers.push(handler);
    }

    /// Shared handle for presentation-side queries.
    pub fn reconciler(&self) -> Arc<Mutex<InventoryReconciler>> {
        Arc::clone(&self.reconciler)
    }

    pub fn statistics(&self) -> Arc<Mutex<SessionStatistics>> {
        Arc::clone(&self.statistics)
    }

    pub fn catalog(&self) -> Arc<Mutex<PriceCatalog>> {
        Arc::clone(&self.catalog)
    }

    /// Parse and process one piece of appended log text.
    pub fn process_text(&mut self, text: &str, now: DateTime<Local>) -> ChunkReport {
        let chunk = self.parser.parse_chunk(text);
        self.process_chunk(&chunk, now)
    }

    pub fn process_chunk(&mut self, chunk: &LogChunk, now: DateTime<Local>) -> ChunkReport {
        let mut report = ChunkReport::default();
        let mut signals = Vec::new();

        if !chunk.price_quotes.is_empty()
            && let Ok(mut catalog) = self.catalog.lock()
        {
            report.prices_updated = catalog.apply_quotes(&chunk.price_quotes, now.timestamp());
        }

        if let Ok(mut reconciler) = self.reconciler.lock() {
            if reconciler.is_awaiting_init()
                && let Some(unique_items) = reconciler.on_bulk_init_writes(&chunk.bulk_init_writes)
            {
                report.initialized_items = Some(unique_items);
                signals.push(EngineSignal::InitializationComplete { unique_items });
            }

            let transition = chunk.map_transition;
            if transition.entering {
                if let Ok(mut stats) = self.statistics.lock() {
                    stats.enter_map(now);
                }
                reconciler.reset_map_baseline();
                report.entered_map = true;
            }
            if transition.exiting {
                if let Ok(mut stats) = self.statistics.lock() {
                    stats.exit_map(now);
                }
                report.exited_map = true;
            }

            // a sort dump supersedes any bag edits logged before it
            let deltas = if report.initialized_items.is_some() {
                reconciler.reconcile(chunk.slot_writes_after_bulk_init())
            } else {
                reconciler.scan_for_changes(chunk)
            };
            drop(reconciler);
            report.deltas = deltas.len();

            if !deltas.is_empty()
                && let Ok(catalog) = self.catalog.lock()
                && let Ok(mut stats) = self.statistics.lock()
            {
                report.valued = stats.apply_deltas(&deltas, &catalog, now).len();
                stats.mark_in_map(now);
                signals.push(EngineSignal::DeltasAvailable { count: deltas.len() });
            }
        }

        self.dispatch_signals(&signals);
        report
    }

    /// Swap in a freshly loaded catalog and value whatever was waiting on it.
    pub fn replace_catalog(&mut self, catalog: PriceCatalog, now: DateTime<Local>) -> usize {
        let Ok(mut current) = self.catalog.lock() else {
            return 0;
        };
        *current = catalog;
        let Ok(mut stats) = self.statistics.lock() else {
            return 0;
        };
        let resolved = stats.resolve_pending(&current, now).len();
        drop(stats);
        drop(current);

        if resolved > 0 {
            self.dispatch_signals(&[EngineSignal::DeltasAvailable { count: resolved }]);
        }
        resolved
    }

    /// Emit the per-poll tick.
    pub fn tick(&mut self) {
        self.dispatch_signals(&[EngineSignal::Tick]);
    }

    pub fn start_initialization(&mut self) -> Option<InitRequest> {
        self.reconciler
            .lock()
            .ok()
            .map(|mut reconciler| reconciler.start_initialization())
    }

    /// Drop the ledger and all counters.
    pub fn reset(&mut self, now: DateTime<Local>) {
        if let Ok(mut reconciler) = self.reconciler.lock() {
            reconciler.reset();
        }
        if let Ok(mut stats) = self.statistics.lock() {
            stats.reset(now);
        }
    }

    fn dispatch_signals(&mut self, signals: &[EngineSignal]) {
        if signals.is_empty() {
            return;
        }
        for handler in &mut self.signal_handlers {
            handler.handle_signals(signals);
        }
    }
}
