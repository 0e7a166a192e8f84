use super::signal::EngineSignal;
use tokio::sync::mpsc::UnboundedSender;

/// Trait for presentation-side consumers of engine signals.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &EngineSignal);

    /// Handle multiple signals (default implementation calls handle_signal for each)
    fn handle_signals(&mut self, signals: &[EngineSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}

/// Forwards signals across threads to an async receiver.
///
/// A closed receiver is not an error for the engine; signals are dropped.
pub struct ChannelSignalHandler {
    tx: UnboundedSender<EngineSignal>,
}

impl ChannelSignalHandler {
    pub fn new(tx: UnboundedSender<EngineSignal>) -> Self {
        Self { tx }
    }
}

impl SignalHandler for ChannelSignalHandler {
    fn handle_signal(&mut self, signal: &EngineSignal) {
        if self.tx.send(*signal).is_err() {
            tracing::trace!(?signal, "Signal receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn forwards_signals_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handler = ChannelSignalHandler::new(tx);

        handler.handle_signals(&[
            EngineSignal::InitializationComplete { unique_items: 8 },
            EngineSignal::Tick,
        ]);

        assert_eq!(
            rx.try_recv().unwrap(),
            EngineSignal::InitializationComplete { unique_items: 8 }
        );
        assert_eq!(rx.try_recv().unwrap(), EngineSignal::Tick);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut handler = ChannelSignalHandler::new(tx);
        handler.handle_signal(&EngineSignal::Tick);
    }
}
