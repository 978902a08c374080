use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// Fixed-capacity FIFO of samples for trend display
#[derive(Debug, Clone, Serialize)]
pub struct HistoryBuffer<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> HistoryBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl<T> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling history for the trended domains
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsHistory {
    pub cpu_usage: HistoryBuffer<f32>,
    pub memory_usage: HistoryBuffer<f32>,
    pub gpu_usage: HistoryBuffer<f32>,
    pub network_in: HistoryBuffer<f64>,
    pub network_out: HistoryBuffer<f64>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cpu_usage: HistoryBuffer::with_capacity(capacity),
            memory_usage: HistoryBuffer::with_capacity(capacity),
            gpu_usage: HistoryBuffer::with_capacity(capacity),
            network_in: HistoryBuffer::with_capacity(capacity),
            network_out: HistoryBuffer::with_capacity(capacity),
        }
    }

    pub fn push_cpu(&mut self, value: f32) {
        self.cpu_usage.push(value);
    }

    pub fn push_memory(&mut self, value: f32) {
        self.memory_usage.push(value);
    }

    pub fn push_gpu(&mut self, value: f32) {
        self.gpu_usage.push(value);
    }

    pub fn push_network(&mut self, speed_in: f64, speed_out: f64) {
        self.network_in.push(speed_in);
        self.network_out.push(speed_out);
    }
}
