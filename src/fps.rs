use std::collections::VecDeque;
use std::time::Instant;

/// Frame-rate estimate over a sliding window of tick intervals.
pub struct FpsCounter {
    last: Instant,
    deltas: VecDeque<f32>,
    buffer_len: usize,
}

impl FpsCounter {
    pub fn new(buffer_len: usize) -> Self {
        Self {
            last: Instant::now(),
            deltas: VecDeque::with_capacity(buffer_len),
            buffer_len: buffer_len.max(1),
        }
    }

    /// Records one frame boundary and returns the smoothed FPS,
    /// rounded to two decimals for display.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;

        if self.deltas.len() == self.buffer_len {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta);

        let sum: f32 = self.deltas.iter().sum();
        if sum <= f32::EPSILON {
            return 0.0;
        }
        let fps = self.deltas.len() as f32 / sum;
        (fps * 100.0).round() / 100.0
    }
}
