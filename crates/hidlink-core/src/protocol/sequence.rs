//! Thread-safe sequence counter for command numbering.
//!
//! Every command datagram carries a monotonically increasing sequence
//! number, and the appliance echoes it back in the reply. Over UDP this is
//! what ties a reply to the call that produced it: a reply carrying a stale
//! sequence (say, from a call that already timed out) can be recognized and
//! discarded instead of being attributed to the current call.
//!
//! The counter advances *before* every send and is never rolled back, even
//! when the send itself fails: a sequence number, once used, is burned.

use std::sync::atomic::{AtomicU32, Ordering};

/// A monotonically increasing counter for command sequence numbers.
///
/// The first call to [`next`] returns 1, matching the appliance's
/// expectation that a session's first command is number 1.
///
/// # Examples
///
/// ```rust
/// use hidlink_core::protocol::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 1);
/// assert_eq!(counter.next(), 2);
/// assert_eq!(counter.current(), 2);
/// ```
///
/// [`next`]: SequenceCounter::next
#[derive(Debug, Default)]
pub struct SequenceCounter {
    inner: AtomicU32,
}

impl SequenceCounter {
    /// Creates a counter whose first [`SequenceCounter::next`] returns 1.
    pub fn new() -> Self {
        Self {
            inner: AtomicU32::new(0),
        }
    }

    /// Atomically increments the counter and returns the new value.
    ///
    /// `Ordering::Relaxed` suffices: the value is only used for numbering,
    /// never for synchronizing other memory between threads. Wraps from
    /// `u32::MAX` to 0 without panicking.
    pub fn next(&self) -> u32 {
        self.inner.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Returns the most recently issued value without advancing.
    pub fn current(&self) -> u32 {
        self.inner.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_value_is_one() {
        let counter = SequenceCounter::new();

        assert_eq!(counter.next(), 1);
    }

    #[test]
    fn test_values_increase_by_one() {
        let counter = SequenceCounter::new();

        let values: Vec<u32> = (0..100).map(|_| counter.next()).collect();

        for (i, value) in values.iter().enumerate() {
            assert_eq!(*value, i as u32 + 1);
        }
    }

    #[test]
    fn test_current_does_not_advance() {
        let counter = SequenceCounter::new();
        counter.next();

        assert_eq!(counter.current(), 1);
        assert_eq!(counter.current(), 1);
        assert_eq!(counter.next(), 2);
    }

    #[test]
    fn test_wraps_without_panicking() {
        let counter = SequenceCounter {
            inner: AtomicU32::new(u32::MAX),
        };

        assert_eq!(counter.next(), 0);
        assert_eq!(counter.next(), 1);
    }

    #[test]
    fn test_concurrent_callers_never_share_a_value() {
        let counter = Arc::new(SequenceCounter::new());
        let threads = 8;
        let per_thread = 1000;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let c = Arc::clone(&counter);
                thread::spawn(move || (0..per_thread).map(|_| c.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect();

        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), threads * per_thread);
    }
}
