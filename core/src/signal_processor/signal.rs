/// Notifications pushed from the engine to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    /// A bag sort dump was accepted as the new baseline.
    InitializationComplete { unique_items: usize },
    /// One chunk produced valued deltas; stats should be re-rendered.
    DeltasAvailable { count: usize },
    /// Emitted once per poll, whether or not anything changed.
    Tick,
}
