//! # Pointer Smoothing
//!
//! Recursive averaging over a short history of previous outputs.
//!
//! Each output is the mean of the new point and the retained outputs, so a
//! filter of capacity `k` reacts within roughly `k` frames while damping the
//! IR camera's jitter:
//!
//! ```text
//! out = (p + h[0] + ... + h[n-1]) / (1 + n)      n <= k
//! ```
//!
//! ## Usage
//!
//! ```
//! use wiiboard::controller::smoothing::SmoothingFilter;
//!
//! let mut filter = SmoothingFilter::new(1);
//! assert_eq!(filter.apply(0.0, 0.0), (0.0, 0.0));
//! assert_eq!(filter.apply(10.0, 0.0), (5.0, 0.0));
//! ```

use std::collections::VecDeque;

/// Default history length.
pub const DEFAULT_SMOOTHING: usize = 4;

/// Bounded recursive averaging filter, most recent output first.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    capacity: usize,
    history: VecDeque<(f64, f64)>,
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl SmoothingFilter {
    /// Creates a filter retaining up to `capacity` outputs.
    ///
    /// A capacity of 0 disables smoothing.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Feeds a raw point and returns the smoothed one.
    pub fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        let count = (self.history.len() + 1) as f64;
        let (sum_x, sum_y) = self
            .history
            .iter()
            .fold((x, y), |(ax, ay), &(hx, hy)| (ax + hx, ay + hy));
        let averaged = (sum_x / count, sum_y / count);

        self.history.push_front(averaged);
        self.history.truncate(self.capacity);

        averaged
    }

    /// Forgets all retained outputs.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_one_sequence() {
        let mut filter = SmoothingFilter::new(1);

        assert_eq!(filter.apply(0.0, 0.0), (0.0, 0.0));
        assert_eq!(filter.apply(10.0, 0.0), (5.0, 0.0));
        assert_eq!(filter.apply(20.0, 0.0), (12.5, 0.0));
    }

    #[test]
    fn test_history_bounded_by_capacity() {
        let mut filter = SmoothingFilter::new(4);
        for i in 0..10 {
            filter.apply(f64::from(i), 0.0);
        }
        assert_eq!(filter.len(), 4);
    }

    #[test]
    fn test_default_capacity_averages_retained_outputs() {
        let mut filter = SmoothingFilter::default();
        assert_eq!(filter.capacity(), 4);

        filter.apply(0.0, 0.0);
        filter.apply(30.0, 30.0); // (0 + 30) / 2 = 15
        // (60 + 15 + 0) / 3 = 25
        assert_eq!(filter.apply(60.0, 60.0), (25.0, 25.0));
    }

    #[test]
    fn test_zero_capacity_passes_through() {
        let mut filter = SmoothingFilter::new(0);
        assert_eq!(filter.apply(3.0, 4.0), (3.0, 4.0));
        assert_eq!(filter.apply(7.0, 9.0), (7.0, 9.0));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_clear_restarts_from_raw() {
        let mut filter = SmoothingFilter::new(2);
        filter.apply(100.0, 100.0);
        filter.clear();

        assert!(filter.is_empty());
        assert_eq!(filter.apply(10.0, 20.0), (10.0, 20.0));
    }
}
