//! Bounded, mirrored frame queue.
//!
//! [`FrameQueue`] is the elastic buffer between host-rate arrival and
//! engine-rate consumption. It stores `N` slots twice over (a "double ring"):
//! every live slot `i` is mirrored at `i + N`, so the readable region and the
//! writable region are each a single contiguous slice regardless of where the
//! indices have wrapped. The rate converter reads and writes those slices
//! directly.
//!
//! ```text
//!  storage: [ 0 .. N ) [ N .. 2N )
//!             main       mirror
//!
//!  peek()        = storage[start .. start + len]      (always contiguous)
//!  write_window  = storage[end   .. end + capacity]   (always contiguous)
//! ```
//!
//! Storage is allocated once at construction; no method allocates afterwards.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec};

/// Error returned by [`FrameQueue::try_push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameQueueError {
    /// The queue already holds `N` frames.
    Overflow,
}

impl core::fmt::Display for FrameQueueError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Overflow => write!(f, "frame queue is full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameQueueError {}

/// Fixed-capacity FIFO of `T` with contiguous read and write windows.
///
/// `N` must be a power of two.
///
/// # Example
///
/// ```rust
/// use annuli_core::{FrameQueue, MonoFrame};
///
/// let mut q: FrameQueue<MonoFrame, 8> = FrameQueue::new();
/// q.push(MonoFrame::mono(0.5));
/// q.push(MonoFrame::mono(0.25));
/// assert_eq!(q.len(), 2);
/// assert_eq!(q.peek()[0], MonoFrame::mono(0.5));
/// q.advance(1);
/// assert_eq!(q.pop(), Some(MonoFrame::mono(0.25)));
/// assert!(q.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct FrameQueue<T, const N: usize> {
    storage: Box<[T]>,
    /// Monotonic read counter (wraps).
    start: usize,
    /// Monotonic write counter (wraps).
    end: usize,
}

impl<T: Copy + Default, const N: usize> FrameQueue<T, N> {
    /// Creates an empty queue.
    ///
    /// # Panics
    ///
    /// Panics if `N` is zero or not a power of two.
    pub fn new() -> Self {
        assert!(N.is_power_of_two(), "FrameQueue capacity must be a power of two");
        Self {
            storage: vec![T::default(); 2 * N].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    #[inline]
    const fn mask(i: usize) -> usize {
        i & (N - 1)
    }

    /// Total number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of frames currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.wrapping_sub(self.start)
    }

    /// Number of free slots.
    #[inline]
    pub fn free(&self) -> usize {
        N - self.len()
    }

    /// True if no frames are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if every slot is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Appends one frame.
    ///
    /// Pushing onto a full queue is a caller error: it trips a debug
    /// assertion in debug builds and is skipped in release builds so the
    /// audio thread keeps running. Guard calls with [`is_full`](Self::is_full).
    #[inline]
    pub fn push(&mut self, frame: T) {
        debug_assert!(!self.is_full(), "push on a full FrameQueue");
        if self.try_push(frame).is_err() {
            #[cfg(feature = "tracing")]
            tracing::trace!("frame_queue: dropped push on full queue");
        }
    }

    /// Appends one frame, reporting overflow instead of dropping it.
    #[inline]
    pub fn try_push(&mut self, frame: T) -> Result<(), FrameQueueError> {
        if self.is_full() {
            return Err(FrameQueueError::Overflow);
        }
        let i = Self::mask(self.end);
        self.storage[i] = frame;
        self.storage[i + N] = frame;
        self.end = self.end.wrapping_add(1);
        Ok(())
    }

    /// Removes and returns the oldest frame.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let frame = self.storage[Self::mask(self.start)];
        self.start = self.start.wrapping_add(1);
        Some(frame)
    }

    /// Contiguous view of every queued frame, oldest first.
    #[inline]
    pub fn peek(&self) -> &[T] {
        let s = Self::mask(self.start);
        &self.storage[s..s + self.len()]
    }

    /// Drops `n` frames from the front (after reading them via [`peek`](Self::peek)).
    ///
    /// `n` is clamped to the queued length.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        let n = n.min(self.len());
        self.start = self.start.wrapping_add(n);
    }

    /// Contiguous writable slots following the last queued frame.
    ///
    /// The returned slice has exactly [`free`](Self::free) elements. Frames
    /// written here become visible only after [`commit`](Self::commit).
    #[inline]
    pub fn write_window(&mut self) -> &mut [T] {
        let e = Self::mask(self.end);
        let free = self.free();
        &mut self.storage[e..e + free]
    }

    /// Publishes `n` frames previously written into [`write_window`](Self::write_window).
    ///
    /// `n` is clamped to the free space. Written slots are copied to their
    /// mirror so both halves stay consistent across the wrap boundary.
    pub fn commit(&mut self, n: usize) {
        let n = n.min(self.free());
        let e = Self::mask(self.end);
        let e1 = e + n;
        let e2 = e1.min(N);
        // Slots written in the main half are mirrored forward.
        self.storage.copy_within(e..e2, e + N);
        if e1 > N {
            // Slots written past the main half are mirrored back to the front.
            self.storage.copy_within(N..e1, 0);
        }
        self.end = self.end.wrapping_add(n);
    }

    /// Discards every queued frame.
    pub fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }
}

impl<T: Copy + Default, const N: usize> Default for FrameQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
