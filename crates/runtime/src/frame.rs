use foundation::time::Time;

/// Upper bound on a single frame step, so a stalled loop does not produce a
/// large jump when it resumes.
pub const MAX_FRAME_DT_S: f64 = 0.1;

/// Per-frame metadata handed to render callbacks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds), already clamped.
    pub dt_s: f64,
    /// Accumulated time at the end of this frame (seconds).
    pub time: Time,
}

/// Produces frames from externally measured deltas.
///
/// The clock never reads wall time itself, so feeding synthetic deltas gives
/// fully reproducible frame sequences.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    next_index: u64,
    time: Time,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt_s: f64) -> Frame {
        let dt_s = if dt_s.is_finite() {
            dt_s.clamp(0.0, MAX_FRAME_DT_S)
        } else {
            0.0
        };
        self.time = self.time.advanced_by(dt_s);
        let frame = Frame {
            index: self.next_index,
            dt_s,
            time: self.time,
        };
        self.next_index += 1;
        frame
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.next_index
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameClock, MAX_FRAME_DT_S};
    use foundation::time::Time;

    #[test]
    fn ticks_accumulate_time_and_index() {
        let mut clock = FrameClock::new();
        let f0 = clock.tick(0.5);
        let f1 = clock.tick(0.05);
        assert_eq!(f0.index, 0);
        assert_eq!(f1.index, 1);
        // 0.5 is clamped to the max step.
        assert_eq!(f0.dt_s, MAX_FRAME_DT_S);
        assert!((f1.time.seconds() - 0.15).abs() < 1e-12);
        assert_eq!(clock.frames_elapsed(), 2);
    }

    #[test]
    fn invalid_deltas_do_not_advance_time() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(-1.0).time, Time(0.0));
        assert_eq!(clock.tick(f64::NAN).time, Time(0.0));
    }
}
