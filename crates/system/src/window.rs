use std::collections::VecDeque;

/// Fixed-capacity FIFO of numeric samples with a moving average.
///
/// Used for CPU utilization smoothing and for mean frame intervals.
/// The mean is recomputed from the current contents on every read, so there
/// is no running-sum drift to account for.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    samples:  VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T>
where
    T: Copy + Into<f64>,
{
    /// A capacity of 0 is treated as 1 so `push` always retains the newest value.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Arithmetic mean of the current contents; `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|&v| v.into()).sum();
        sum / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> Option<T> {
        self.samples.back().copied()
    }

    /// Samples oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.samples.iter().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
