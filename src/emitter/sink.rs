//! Output destinations for emitted events
//!
//! The emitter is the only writer of its sink and never closes it. A sink may
//! block (bounded channel at capacity); that stall is the backpressure the
//! emitter passes on to every pusher.
//!
//! # Blocking sinks and async code
//! `std::sync::mpsc::SyncSender` and `tokio::sync::mpsc::Sender` block the
//! calling thread when full. Drive an emitter that owns one of them from
//! `tokio::task::spawn_blocking` or a plain thread, never from an async task:
//! `tokio::sync::mpsc::Sender::blocking_send` panics inside a runtime context.

use std::sync::{mpsc, Arc};

use parking_lot::Mutex;
use thiserror::Error;

/// Delivery failure; hands the event back to the caller
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SinkError<T> {
    /// Receiving side is gone; the event was not delivered
    #[error("sink closed: receiver dropped")]
    Closed(T),
}

impl<T> SinkError<T> {
    /// Recover the undelivered event
    pub fn into_inner(self) -> T {
        match self {
            Self::Closed(event) => event,
        }
    }
}

/// Destination for events leaving the emitter, in emission order
pub trait EventSink<T> {
    /// Deliver one event, blocking while the sink is full
    fn emit(&self, event: T) -> Result<(), SinkError<T>>;
}

impl<T, S: EventSink<T> + ?Sized> EventSink<T> for &S {
    fn emit(&self, event: T) -> Result<(), SinkError<T>> {
        (**self).emit(event)
    }
}

impl<T, S: EventSink<T> + ?Sized> EventSink<T> for Arc<S> {
    fn emit(&self, event: T) -> Result<(), SinkError<T>> {
        (**self).emit(event)
    }
}

impl<T> EventSink<T> for mpsc::Sender<T> {
    fn emit(&self, event: T) -> Result<(), SinkError<T>> {
        self.send(event).map_err(|mpsc::SendError(e)| SinkError::Closed(e))
    }
}

impl<T> EventSink<T> for mpsc::SyncSender<T> {
    fn emit(&self, event: T) -> Result<(), SinkError<T>> {
        self.send(event).map_err(|mpsc::SendError(e)| SinkError::Closed(e))
    }
}

impl<T> EventSink<T> for tokio::sync::mpsc::UnboundedSender<T> {
    fn emit(&self, event: T) -> Result<(), SinkError<T>> {
        self.send(event)
            .map_err(|tokio::sync::mpsc::error::SendError(e)| SinkError::Closed(e))
    }
}

impl<T> EventSink<T> for tokio::sync::mpsc::Sender<T> {
    fn emit(&self, event: T) -> Result<(), SinkError<T>> {
        self.blocking_send(event)
            .map_err(|tokio::sync::mpsc::error::SendError(e)| SinkError::Closed(e))
    }
}

/// In-memory sink that keeps everything it receives
///
/// Cloning shares the underlying buffer, so a test can hand one clone to the
/// emitter and inspect the other.
#[derive(Debug)]
pub struct CollectingSink<T> {
    events: Arc<Mutex<Vec<T>>>,
}

impl<T> CollectingSink<T> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of events received so far
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Take everything received so far, leaving the sink empty
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl<T: Clone> CollectingSink<T> {
    /// Copy of everything received so far
    pub fn snapshot(&self) -> Vec<T> {
        self.events.lock().clone()
    }
}

impl<T> Clone for CollectingSink<T> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<T> Default for CollectingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventSink<T> for CollectingSink<T> {
    fn emit(&self, event: T) -> Result<(), SinkError<T>> {
        self.events.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_channel_sink() {
        let (tx, rx) = mpsc::channel();
        tx.emit(1u32).unwrap();
        tx.emit(2u32).unwrap();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn std_channel_closed() {
        let (tx, rx) = mpsc::sync_channel::<u32>(1);
        drop(rx);
        let err = tx.emit(7).unwrap_err();
        assert_eq!(err, SinkError::Closed(7));
        assert_eq!(err.into_inner(), 7);
    }

    #[test]
    fn tokio_unbounded_closed() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<&str>();
        tx.emit("a").unwrap();
        drop(rx);
        assert_eq!(tx.emit("b"), Err(SinkError::Closed("b")));
    }

    #[test]
    fn tokio_bounded_outside_runtime() {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<u8>(2);
        tx.emit(1).unwrap();
        tx.emit(2).unwrap();
        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
    }

    #[test]
    fn collecting_sink_shares_buffer() {
        let sink = CollectingSink::new();
        let handle = sink.clone();
        sink.emit('x').unwrap();
        sink.emit('y').unwrap();
        assert_eq!(handle.len(), 2);
        assert_eq!(handle.snapshot(), vec!['x', 'y']);
        assert_eq!(handle.take(), vec!['x', 'y']);
        assert!(sink.is_empty());
    }

    #[test]
    fn error_message() {
        let err = SinkError::Closed(0u8);
        assert!(err.to_string().contains("sink closed"));
    }
}
