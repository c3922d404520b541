//! Overwriting ring buffer implementation.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{BufferError, Result};

/// A thread-safe overwriting ring buffer.
///
/// `RingBuffer<T>` is a circular buffer with a fixed capacity. When the
/// buffer is full, new writes overwrite the oldest data instead of
/// blocking, so the most recent `capacity` samples are always retained.
///
/// # Semantics
///
/// - **Write**: Never blocks, overwrites oldest data when full
/// - **Read**: Never blocks, fails when not enough data is stored
/// - **Failure**: Every error leaves the buffer untouched
///
/// Every operation holds the buffer's lock for its whole duration, so
/// operations are linearizable with respect to each other.
///
/// # Example
///
/// ```
/// use physio_buffer::RingBuffer;
///
/// // Keep only the 100 most recent samples
/// let buf = RingBuffer::<f32>::new(100);
///
/// for i in 0..200 {
///     buf.enqueue(i as f32).unwrap();
/// }
///
/// // Buffer contains only the last 100 samples (100..200)
/// assert_eq!(buf.len(), 100);
/// assert_eq!(buf.front().unwrap(), 100.0);
/// ```
pub struct RingBuffer<T> {
    inner: Arc<Mutex<RingBufferState<T>>>,
}

struct RingBufferState<T> {
    buf: Vec<T>,
    head: usize, // oldest element
    tail: usize, // next write slot
    size: usize,
}

impl<T> RingBufferState<T> {
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Preconditions shared by every windowed read, checked in order.
    fn check_window(&self, requested: usize, overlap: usize) -> Result<()> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        if requested > capacity {
            return Err(BufferError::ExceedsCapacity {
                requested,
                capacity,
            });
        }
        if overlap > requested {
            return Err(BufferError::InvalidOverlap { overlap, requested });
        }
        if requested > self.size {
            return Err(BufferError::Insufficient {
                requested,
                available: self.size,
            });
        }
        Ok(())
    }

    fn check_single(&self) -> Result<()> {
        if self.capacity() == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        if self.size == 0 {
            return Err(BufferError::Empty);
        }
        Ok(())
    }

    /// Drops the `n` oldest elements. Callers guarantee `n <= size`.
    fn drop_oldest(&mut self, n: usize) {
        self.head = (self.head + n) % self.capacity();
        self.size -= n;
    }

    fn push(&mut self, item: T) {
        let capacity = self.capacity();
        let tail = self.tail;
        self.buf[tail] = item;
        self.tail = (tail + 1) % capacity;
        self.size += 1;
    }
}

impl<T: Clone + Default> RingBufferState<T> {
    /// Returns the element `i` places after `head`. The first `consumed`
    /// positions are moved out, the rest are cloned.
    fn read(&mut self, i: usize, consumed: usize) -> T {
        let idx = (self.head + i) % self.capacity();
        if i < consumed {
            std::mem::take(&mut self.buf[idx])
        } else {
            self.buf[idx].clone()
        }
    }
}

impl<T> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        RingBuffer {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for RingBuffer<T> {
    /// Creates a zero-capacity buffer, unusable until [`RingBuffer::resize`].
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> RingBuffer<T> {
    /// Returns the number of elements currently in the buffer.
    pub fn len(&self) -> usize {
        self.inner.lock().size
    }

    /// Returns the buffer capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Returns true if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().size == 0
    }

    /// Returns true if the next enqueue would overwrite the oldest element.
    ///
    /// A zero-capacity buffer is both empty and full.
    pub fn is_full(&self) -> bool {
        let state = self.inner.lock();
        state.size >= state.capacity()
    }

    /// Adds a single element to the buffer.
    ///
    /// If the buffer is full, the oldest element is dropped first.
    pub fn enqueue(&self, item: T) -> Result<()> {
        let mut state = self.inner.lock();

        if state.capacity() == 0 {
            return Err(BufferError::ZeroCapacity);
        }

        if state.size == state.capacity() {
            trace!("ring buffer full, overwriting oldest element");
            state.drop_oldest(1);
        }

        state.push(item);
        Ok(())
    }
}

impl<T: Default> RingBuffer<T> {
    /// Creates a new RingBuffer with the specified capacity.
    ///
    /// A capacity of 0 is legal; such a buffer rejects every data
    /// operation until it is resized.
    pub fn new(capacity: usize) -> Self {
        RingBuffer {
            inner: Arc::new(Mutex::new(RingBufferState {
                buf: default_slots(capacity),
                head: 0,
                tail: 0,
                size: 0,
            })),
        }
    }

    /// Removes and returns the oldest element.
    pub fn dequeue(&self) -> Result<T> {
        let mut state = self.inner.lock();
        state.check_single()?;

        let head = state.head;
        let item = std::mem::take(&mut state.buf[head]);
        state.drop_oldest(1);
        Ok(item)
    }

    /// Reallocates the buffer with a new capacity.
    ///
    /// All stored data is discarded; nothing is migrated to the new storage.
    pub fn resize(&self, capacity: usize) {
        let mut state = self.inner.lock();
        debug!(
            "resizing ring buffer from {} to {} (discarding {} elements)",
            state.capacity(),
            capacity,
            state.size
        );
        state.buf = default_slots(capacity);
        state.head = 0;
        state.tail = 0;
        state.size = 0;
    }

    /// Resets every slot to its default value and empties the buffer.
    ///
    /// The capacity is unchanged.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        for slot in state.buf.iter_mut() {
            *slot = T::default();
        }
        state.head = 0;
        state.tail = 0;
        state.size = 0;
    }
}

impl<T: Clone + Default> RingBuffer<T> {
    /// Adds a batch of elements to the buffer.
    ///
    /// Fails without writing anything if the batch is larger than the
    /// capacity. Otherwise drops exactly as many of the oldest elements as
    /// needed to make room, so the result is the same as enqueuing the
    /// items one at a time.
    pub fn enqueue_slice(&self, items: &[T]) -> Result<()> {
        let mut state = self.inner.lock();

        let capacity = state.capacity();
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        if items.len() > capacity {
            return Err(BufferError::ExceedsCapacity {
                requested: items.len(),
                capacity,
            });
        }

        let overflow = (state.size + items.len()).saturating_sub(capacity);
        if overflow > 0 {
            trace!("ring buffer full, overwriting {} oldest elements", overflow);
            state.drop_oldest(overflow);
        }

        for item in items {
            state.push(item.clone());
        }
        Ok(())
    }

    /// Reads a window of `out.len()` elements, oldest first.
    ///
    /// Only the first `out.len() - overlap` elements are removed; the last
    /// `overlap` stay in the buffer and open the next window. With
    /// `overlap == 0` this is a plain batch dequeue.
    ///
    /// ```
    /// use physio_buffer::RingBuffer;
    ///
    /// let buf = RingBuffer::<i32>::new(8);
    /// buf.enqueue_slice(&[1, 2, 3, 4, 5, 6]).unwrap();
    ///
    /// let mut window = [0; 4];
    /// buf.dequeue_into(&mut window, 2).unwrap();
    /// assert_eq!(window, [1, 2, 3, 4]);
    ///
    /// buf.dequeue_into(&mut window, 2).unwrap();
    /// assert_eq!(window, [3, 4, 5, 6]);
    /// ```
    pub fn dequeue_into(&self, out: &mut [T], overlap: usize) -> Result<()> {
        let mut state = self.inner.lock();
        state.check_window(out.len(), overlap)?;

        let consumed = out.len() - overlap;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = state.read(i, consumed);
        }

        state.drop_oldest(consumed);
        Ok(())
    }

    /// Like [`RingBuffer::dequeue_into`], returning the window as a new vector.
    pub fn dequeue_many(&self, n: usize, overlap: usize) -> Result<Vec<T>> {
        let mut state = self.inner.lock();
        state.check_window(n, overlap)?;

        let consumed = n - overlap;
        let out: Vec<T> = (0..n).map(|i| state.read(i, consumed)).collect();

        state.drop_oldest(consumed);
        Ok(out)
    }

    /// Returns a copy of the oldest element without removing it.
    pub fn front(&self) -> Result<T> {
        let state = self.inner.lock();
        state.check_single()?;
        Ok(state.buf[state.head].clone())
    }

    /// Copies the `out.len()` oldest elements without removing them.
    pub fn front_into(&self, out: &mut [T]) -> Result<()> {
        let mut state = self.inner.lock();
        state.check_window(out.len(), 0)?;

        for (i, slot) in out.iter_mut().enumerate() {
            *slot = state.read(i, 0);
        }
        Ok(())
    }

    /// Like [`RingBuffer::front_into`], returning the elements as a new vector.
    pub fn front_many(&self, n: usize) -> Result<Vec<T>> {
        let mut state = self.inner.lock();
        state.check_window(n, 0)?;

        Ok((0..n).map(|i| state.read(i, 0)).collect())
    }

    /// Returns a copy of all stored elements, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        let state = self.inner.lock();
        let capacity = state.capacity();
        (0..state.size)
            .map(|i| state.buf[(state.head + i) % capacity].clone())
            .collect()
    }
}

fn default_slots<T: Default>(capacity: usize) -> Vec<T> {
    let mut buf = Vec::with_capacity(capacity);
    buf.resize_with(capacity, T::default);
    buf
}
