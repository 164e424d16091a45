use std::time::Duration;

/// Fixed-capacity ring of recent frame times for the overlay's frame-rate
/// readout.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    samples: Vec<Duration>,
    capacity: usize,
    cursor: usize,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            cursor: 0,
        }
    }

    /// Record one frame's duration, displacing the oldest sample once the
    /// ring is full.
    pub fn record(&mut self, frame_time: Duration) {
        if self.samples.len() < self.capacity {
            self.samples.push(frame_time);
        } else {
            self.samples[self.cursor] = frame_time;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean of the recorded samples, in milliseconds.
    pub fn average_ms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: Duration = self.samples.iter().sum();
        total.as_secs_f32() * 1000.0 / self.samples.len() as f32
    }

    /// Slowest recorded sample, in milliseconds.
    pub fn worst_ms(&self) -> f32 {
        self.samples
            .iter()
            .max()
            .map(|d| d.as_secs_f32() * 1000.0)
            .unwrap_or(0.0)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}
