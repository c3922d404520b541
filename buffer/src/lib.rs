//! Thread-safe sample ring buffer.
//!
//! This crate provides [`RingBuffer<T>`], a fixed-capacity circular buffer
//! for moving sensor samples between producer and consumer threads with
//! bounded memory. When the buffer is full, writes overwrite the oldest
//! unread samples instead of blocking or failing.
//!
//! # Example
//!
//! ```
//! use physio_buffer::RingBuffer;
//!
//! let buf = RingBuffer::<i32>::new(3);
//! for i in 1..=5 {
//!     buf.enqueue(i).unwrap(); // Overwrites 1, 2
//! }
//! assert_eq!(buf.dequeue_many(3, 0).unwrap(), vec![3, 4, 5]);
//! ```
//!
//! # Windowed reads
//!
//! [`RingBuffer::dequeue_into`] and [`RingBuffer::dequeue_many`] take an
//! `overlap`: the last `overlap` elements of a window are copied out but
//! left in the buffer, so consecutive windows share them. This is the
//! building block for sliding-window signal processing.
//!
//! # Failures
//!
//! Nothing in this crate waits. A read with too little data, a batch larger
//! than the capacity, or any operation on a zero-capacity buffer returns a
//! [`BufferError`] and leaves the buffer untouched.
//!
//! # Thread Safety
//!
//! [`RingBuffer<T>`] is `Send + Sync` and `Clone`; clones share the same
//! storage via `Arc`, which is how a producer and a consumer share one
//! buffer.

mod error;
mod ring_buffer;

pub use error::{BufferError, Result};
pub use ring_buffer::RingBuffer;
