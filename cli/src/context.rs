use loot_core::catalog::PriceCatalog;
use loot_core::context::{AppConfig, MonitorHandle};
use loot_core::inventory::InventoryReconciler;
use loot_core::stats::SessionStatistics;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Shared handles into a running tracking session. The engine thread owns
/// the session; these are the presentation side of its locks.
#[derive(Clone)]
pub struct EngineHandles {
    pub reconciler: Arc<std::sync::Mutex<InventoryReconciler>>,
    pub statistics: Arc<std::sync::Mutex<SessionStatistics>>,
    pub catalog: Arc<std::sync::Mutex<PriceCatalog>>,
}

#[derive(Default)]
pub struct BackgroundTasks {
    pub monitor: Option<MonitorHandle>,
    pub presenter: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Stop the monitor thread and the presenter task.
    pub fn stop_all(&mut self) -> Result<(), String> {
        if let Some(handle) = self.presenter.take() {
            handle.abort();
        }
        if let Some(monitor) = self.monitor.take() {
            monitor.stop().map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

/// Holds all shared state for the CLI application.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    /// Handles of the active session. None until `watch` or `replay` ran.
    engine: Arc<RwLock<Option<EngineHandles>>>,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
}

impl CliContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            engine: Arc::new(RwLock::new(None)),
            tasks: Arc::new(Mutex::new(BackgroundTasks::default())),
        }
    }

    pub async fn set_engine(&self, handles: EngineHandles) {
        *self.engine.write().await = Some(handles);
    }

    pub async fn engine(&self) -> Option<EngineHandles> {
        self.engine.read().await.clone()
    }
}
