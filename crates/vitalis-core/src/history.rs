//! Bounded respiration-rate smoothing buffer.
//!
//! A FIFO of the most recent valid RR estimates. The reported value is the
//! median of the buffer, which damps single-tick spectral noise (spurious
//! peaks from motion artifacts) while the window keeps moving.

use std::collections::VecDeque;

/// FIFO of at most `capacity` finite RR estimates.
#[derive(Debug, Clone)]
pub struct RrHistory {
    buf: VecDeque<f32>,
    capacity: usize,
}

impl RrHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a raw estimate; non-finite values are discarded, the oldest
    /// entry is evicted on overflow.
    pub fn push(&mut self, rr: f32) {
        if !rr.is_finite() {
            return;
        }
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(rr);
    }

    /// Median of the current contents, `None` when empty. For an even count
    /// this is the mean of the two middle values.
    pub fn median(&self) -> Option<f32> {
        if self.buf.is_empty() {
            return None;
        }
        let mut sorted: Vec<f32> = self.buf.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            Some(sorted[mid])
        } else {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop all entries (connection teardown).
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_bounded_with_fifo_eviction() {
        let mut history = RrHistory::new(5);
        for rr in [10.0, 11.0, 12.0, 13.0, 14.0, 15.0] {
            history.push(rr);
        }
        assert_eq!(history.len(), 5);
        // Oldest of the six (10.0) is gone: median of 11..=15 is 13
        assert_eq!(history.median(), Some(13.0));
    }

    #[test]
    fn median_odd_and_even() {
        let mut history = RrHistory::new(5);
        history.push(18.0);
        assert_eq!(history.median(), Some(18.0));
        history.push(12.0);
        assert_eq!(history.median(), Some(15.0));
        history.push(30.0);
        assert_eq!(history.median(), Some(18.0));
    }

    #[test]
    fn rejects_non_finite() {
        let mut history = RrHistory::new(5);
        history.push(f32::NAN);
        history.push(f32::INFINITY);
        history.push(f32::NEG_INFINITY);
        assert!(history.is_empty());
        assert_eq!(history.median(), None);
    }

    #[test]
    fn clear_empties_buffer() {
        let mut history = RrHistory::new(5);
        history.push(18.0);
        history.clear();
        assert!(history.is_empty());
    }
}
