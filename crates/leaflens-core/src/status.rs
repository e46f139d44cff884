//! Status fan-out.
//!
//! `StatusObservers` delivers each `StatusEvent` to every registered
//! observer. `ChannelObserver` turns the callback form into a stream for
//! callers that prefer to `recv()` events from another task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use leaflens_contracts::status::StatusEvent;

use crate::traits::StatusObserver;

/// A set of observers notified in registration order.
#[derive(Clone, Default)]
pub struct StatusObservers {
    observers: Vec<Arc<dyn StatusObserver>>,
}

impl StatusObservers {
    /// An empty set. Emitting to it is a no-op.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn register(&mut self, observer: Arc<dyn StatusObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn emit(&self, event: &StatusEvent) {
        debug!(
            run_id = %event.run_id,
            state = ?event.state,
            observers = self.observers.len(),
            "status transition"
        );
        for observer in &self.observers {
            observer.on_status(event);
        }
    }
}

/// Forwards events into an unbounded mpsc channel.
///
/// A dropped receiver is not an error; events are discarded.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelObserver {
    /// Create the observer and the receiving half of its channel.
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl StatusObserver for ChannelObserver {
    fn on_status(&self, event: &StatusEvent) {
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use leaflens_contracts::{
        request::RunId,
        status::{PipelineState, StatusEvent},
    };

    use super::*;

    #[test]
    fn every_observer_sees_every_event() {
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));

        let a = Arc::clone(&seen_a);
        let b = Arc::clone(&seen_b);
        let observers = StatusObservers::none()
            .with(Arc::new(move |e: &StatusEvent| a.lock().unwrap().push(e.state)))
            .with(Arc::new(move |e: &StatusEvent| b.lock().unwrap().push(e.state)));

        let run_id = RunId::new();
        observers.emit(&StatusEvent::new(run_id, PipelineState::Analyzing));
        observers.emit(&StatusEvent::new(run_id, PipelineState::Done));

        let expected = vec![PipelineState::Analyzing, PipelineState::Done];
        assert_eq!(*seen_a.lock().unwrap(), expected);
        assert_eq!(*seen_b.lock().unwrap(), expected);
    }

    #[test]
    fn channel_observer_streams_events() {
        let (observer, mut rx) = ChannelObserver::channel();
        let observers = StatusObservers::none().with(observer);

        let run_id = RunId::new();
        observers.emit(&StatusEvent::new(run_id, PipelineState::Classifying));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.run_id, run_id);
        assert_eq!(event.state, PipelineState::Classifying);
        assert_eq!(event.label, PipelineState::Classifying.label());
    }

    #[test]
    fn channel_observer_tolerates_dropped_receiver() {
        let (observer, rx) = ChannelObserver::channel();
        drop(rx);
        observer.on_status(&StatusEvent::new(RunId::new(), PipelineState::Done));
    }
}
