/// Deterministic frame metadata.
///
/// The explorer has no simulation clock of its own; frames only drive the
/// per-frame camera observer and the loading spinner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self { index, dt_s }
    }

    pub fn first(dt_s: f64) -> Self {
        Self::new(0, dt_s)
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    /// Elapsed time at the start of this frame (seconds).
    pub fn elapsed_s(&self) -> f64 {
        self.index as f64 * self.dt_s
    }

    /// Index of a looping animation that advances every `step_s` seconds.
    pub fn cycle(&self, step_s: f64, len: usize) -> usize {
        if len == 0 || step_s <= 0.0 {
            return 0;
        }
        ((self.elapsed_s() / step_s).floor() as u64 % len as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.elapsed_s(), 10.0 / 60.0);
    }

    #[test]
    fn next_advances_index_and_time() {
        let f1 = Frame::first(0.5).next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.elapsed_s(), 0.5);
    }

    #[test]
    fn cycle_wraps_at_len() {
        let f = Frame::new(25, 0.05);
        // 1.25s at 100ms per step is step 12, wrapped into 10 frames.
        assert_eq!(f.cycle(0.1, 10), 2);
        assert_eq!(f.cycle(0.1, 0), 0);
    }
}
