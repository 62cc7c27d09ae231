//! Event channel implementation using crossbeam-channel.
//!
//! Cloneable senders are shared by the rayon workers of a batch.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Sending half handed to the engine.
///
/// Cheap to clone; every worker of a batch holds a copy.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Emit an event.
    ///
    /// A disconnected receiver discards the event; evaluation never
    /// depends on anyone listening.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half held by the CLI or another observer
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; evaluation events are small
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Channel holding at most `capacity` pending events.
    ///
    /// Senders block while it is full, which throttles a batch to the pace
    /// of a slow observer.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}

/// Sender whose receiver is already gone; for callers that don't observe
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BatchEvent, BatchProgress, EvaluationEvent};
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Batch(BatchEvent::Progress(BatchProgress {
                completed: 3,
                total: 10,
                keyword: "yk".to_string(),
            })));
        });

        handle.join().unwrap();

        match receiver.iter().next().unwrap() {
            Event::Batch(BatchEvent::Progress(p)) => {
                assert_eq!(p.completed, 3);
                assert_eq!(p.keyword, "yk");
            }
            _ => panic!("Wrong event type"),
        };
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Evaluation(EvaluationEvent::Started {
            keyword: "yk".to_string(),
            regions: 0,
        }));
    }

    #[test]
    fn bounded_channel_respects_capacity() {
        let (sender, receiver) = EventChannel::bounded(2);

        sender.send(Event::Batch(BatchEvent::Started { total_pages: 1 }));
        sender.send(Event::Batch(BatchEvent::Completed { total_reports: 1 }));

        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }
}
