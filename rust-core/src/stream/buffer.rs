//! Sliding-window sample buffer
//!
//! Fixed-capacity ring of the most recent N samples; once full, each push
//! evicts the oldest value

use ringbuf::{HeapRb, Rb};

/// Ordered, fixed-length copy of buffered samples (oldest first)
///
/// Never aliases the live buffer; the scheduler may keep pushing while a
/// frame is being transformed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame(Vec<f64>);

impl Frame {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for Frame {
    fn from(samples: Vec<f64>) -> Self {
        Self(samples)
    }
}

/// Ring buffer of real-valued samples
pub struct SampleBuffer {
    ring: HeapRb<f64>,
    capacity: usize,
    total_pushed: u64,
}

impl SampleBuffer {
    /// Create new sample buffer
    ///
    /// # Arguments
    /// * `capacity` - Window length N in samples
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity.max(1)),
            capacity,
            total_pushed: 0,
        }
    }

    /// Append one sample, evicting the oldest once capacity is reached
    pub fn push(&mut self, sample: f64) {
        if self.capacity == 0 {
            return;
        }
        self.ring.push_overwrite(sample);
        self.total_pushed += 1;
    }

    /// True once N samples have been observed since creation or the last clear
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.ring.len() == self.capacity
    }

    /// Copy the current contents in chronological order
    ///
    /// Before the buffer is full the frame is shorter than N; the transform
    /// rejects such frames rather than padding them.
    pub fn snapshot(&self) -> Frame {
        Frame(self.ring.iter().copied().collect())
    }

    /// Drop every buffered sample
    pub fn clear(&mut self) {
        self.ring.clear();
        self.total_pushed = 0;
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples pushed since creation or the last clear
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_then_reports_full() {
        let mut buffer = SampleBuffer::new(4);
        assert!(buffer.is_empty());

        for i in 0..3 {
            buffer.push(i as f64);
            assert!(!buffer.is_full());
        }
        buffer.push(3.0);

        assert!(buffer.is_full());
        assert_eq!(buffer.snapshot().as_slice(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sliding_window_keeps_last_n() {
        let mut buffer = SampleBuffer::new(64);

        for total in [64usize, 65, 100, 1000] {
            buffer.clear();
            for i in 0..total {
                buffer.push(i as f64);
            }

            let frame = buffer.snapshot();
            assert_eq!(frame.len(), 64);

            let expected: Vec<f64> = (total - 64..total).map(|i| i as f64).collect();
            assert_eq!(frame.as_slice(), expected.as_slice());
        }
    }

    #[test]
    fn test_snapshot_leaves_buffer_unmodified() {
        let mut buffer = SampleBuffer::new(3);
        for x in [1.0, 2.0, 3.0, 4.0] {
            buffer.push(x);
        }

        let first = buffer.snapshot();
        let second = buffer.snapshot();
        assert_eq!(first, second);
        assert_eq!(buffer.len(), 3);

        // Frame is a copy; later pushes don't show through
        buffer.push(5.0);
        assert_eq!(first.as_slice(), &[2.0, 3.0, 4.0]);
        assert_eq!(buffer.snapshot().as_slice(), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_partial_snapshot() {
        let mut buffer = SampleBuffer::new(8);
        buffer.push(1.5);
        buffer.push(2.5);

        assert_eq!(buffer.snapshot().as_slice(), &[1.5, 2.5]);
    }

    #[test]
    fn test_clear_resets_fill_state() {
        let mut buffer = SampleBuffer::new(2);
        buffer.push(1.0);
        buffer.push(2.0);
        assert!(buffer.is_full());

        buffer.clear();
        assert!(!buffer.is_full());
        assert!(buffer.is_empty());
        assert_eq!(buffer.total_pushed(), 0);
        assert!(buffer.snapshot().is_empty());
    }
}
