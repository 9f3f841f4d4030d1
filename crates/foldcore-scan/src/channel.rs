use std::sync::mpsc;

use crate::ScanEvent;

/// A [`ScanEvent`] tagged with the search generation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMessage {
    pub generation: u64,
    pub event: ScanEvent,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ScanMessage>,
    generation: u64,
}

pub struct EventReceiver {
    rx: mpsc::Receiver<ScanMessage>,
}

pub fn result_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel::<ScanMessage>();
    (EventSender { tx, generation: 0 }, EventReceiver { rx })
}

impl EventSender {
    /// A sender on the same queue whose events carry `generation`.
    pub fn with_generation(&self, generation: u64) -> Self {
        Self {
            tx: self.tx.clone(),
            generation,
        }
    }
}

/// Destination for the events of one scan.
pub trait EventSink {
    /// Never blocks.
    fn push(&self, event: ScanEvent);

    /// Search generation stamped on pushed events, used for log context.
    fn generation(&self) -> u64;
}

impl EventSink for EventSender {
    fn generation(&self) -> u64 {
        self.generation
    }

    /// Events pushed after the receiver is gone are discarded.
    fn push(&self, event: ScanEvent) {
        let message = ScanMessage {
            generation: self.generation,
            event,
        };
        if self.tx.send(message).is_err() {
            tracing::debug!(generation = self.generation, "result receiver dropped");
        }
    }
}

impl EventReceiver {
    /// Everything queued so far, in arrival order. Returns an empty vec when idle.
    pub fn try_drain_all(&self) -> Vec<ScanMessage> {
        self.rx.try_iter().collect()
    }
}
