//! event-reorder: bounded reordering of out-of-order event streams
//!
//! `OrderedEmitter` buffers events in a comparator-ordered min-heap and
//! releases the smallest one each time the buffer reaches its threshold.
//! `flush` drains the remainder in order.

pub mod common;
pub mod config;
pub mod emitter;
pub mod source;

pub use emitter::{Comparator, EventSink, OrderedEmitter};
