//! Frame timing and progress
//!
//! Animations advance in whole time steps. The wall-clock delta of each frame
//! is converted into steps through a fractional accumulator so that frame
//! jitter never changes the total number of steps an animation takes.

/// Smallest remaining time left on a reversed animation
///
/// Keeps a reversal at the very start from finishing immediately.
pub const EPSILON_MS: f32 = 1e-4;

/// Default step length in milliseconds
pub const DEFAULT_TIME_STEP_MS: f32 = 10.0;

/// Remaining-time accumulator of one animation run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationTimer {
    pub total_ms: f32,
    pub remaining_ms: f32,
    pub step_ms: f32,
    /// Fractional steps carried over to the next frame
    pub remainder_steps: f32,
    /// Time to wait before the first step
    pub delay_ms: f32,
    /// Milliseconds consumed by the last [`advance`](Self::advance)
    pub last_advance_ms: f32,
}

impl Default for AnimationTimer {
    fn default() -> Self {
        Self::idle()
    }
}

impl AnimationTimer {
    /// A timer with `total_ms` left, advancing in `step_ms` increments
    pub fn new(total_ms: f32, step_ms: f32) -> Self {
        let step_ms = if step_ms > 0.0 { step_ms } else { DEFAULT_TIME_STEP_MS };
        let total_ms = total_ms.max(0.0);
        Self {
            total_ms,
            remaining_ms: total_ms,
            step_ms,
            remainder_steps: 0.0,
            delay_ms: 0.0,
            last_advance_ms: 0.0,
        }
    }

    /// A finished timer
    pub fn idle() -> Self {
        let mut timer = Self::new(0.0, DEFAULT_TIME_STEP_MS);
        timer.remaining_ms = 0.0;
        timer
    }

    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn is_running(&self) -> bool {
        self.remaining_ms > 0.0
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_ms <= 0.0
    }

    /// Consume `dt_ms` of wall-clock time and return the whole steps taken
    pub fn advance(&mut self, dt_ms: f32) -> u32 {
        self.last_advance_ms = 0.0;
        let mut dt = dt_ms.max(0.0);
        if self.delay_ms > 0.0 {
            let waited = dt.min(self.delay_ms);
            self.delay_ms -= waited;
            dt -= waited;
        }
        if self.is_finished() || dt <= 0.0 {
            return 0;
        }

        self.remainder_steps += dt / self.step_ms;
        let steps = self.remainder_steps.floor();
        self.remainder_steps -= steps;

        let consumed = (steps * self.step_ms).min(self.remaining_ms);
        self.remaining_ms = (self.remaining_ms - steps * self.step_ms).max(0.0);
        self.last_advance_ms = consumed;
        steps as u32
    }

    /// Play the run backwards from the point reached so far
    pub fn reverse(&mut self) {
        self.remaining_ms = (self.total_ms - self.remaining_ms).max(EPSILON_MS);
        self.remainder_steps = 0.0;
        self.delay_ms = 0.0;
    }

    /// Jump to the end
    pub fn finish(&mut self) {
        self.remaining_ms = 0.0;
        self.delay_ms = 0.0;
    }

    pub fn progress(&self, reverse: bool) -> f32 {
        progress(self.remaining_ms, self.total_ms, self.step_ms, reverse)
    }
}

/// Normalized progress of a run
///
/// The first step is excluded so that the first frame already shows visible
/// movement and the last step lands exactly on 1.
pub fn progress(remaining_ms: f32, total_ms: f32, step_ms: f32, reverse: bool) -> f32 {
    let span = total_ms - step_ms;
    let forward = if span <= 0.0 {
        1.0
    } else {
        (1.0 - remaining_ms / span).clamp(0.0, 1.0)
    };
    if reverse {
        1.0 - forward
    } else {
        forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_frame_rate_independent() {
        let mut timer = AnimationTimer::new(200.0, 20.0);
        for frame in 1..=10 {
            assert_eq!(timer.advance(20.0), 1);
            if frame < 10 {
                assert!(timer.is_running(), "finished early at frame {}", frame);
            }
        }
        assert_eq!(timer.remaining_ms, 0.0);
        assert!(timer.is_finished());
    }

    #[test]
    fn test_fractional_frames_accumulate() {
        let mut timer = AnimationTimer::new(100.0, 10.0);
        assert_eq!(timer.advance(4.0), 0);
        assert_eq!(timer.advance(4.0), 0);
        assert_eq!(timer.advance(4.0), 1);
        assert!((timer.remaining_ms - 90.0).abs() < 0.001);
        assert!((timer.remainder_steps - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_delay_consumed_first() {
        let mut timer = AnimationTimer::new(100.0, 10.0).with_delay(25.0);
        assert_eq!(timer.advance(20.0), 0);
        assert_eq!(timer.remaining_ms, 100.0);
        assert_eq!(timer.advance(15.0), 1);
        assert!((timer.remaining_ms - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_remaining_never_negative() {
        let mut timer = AnimationTimer::new(30.0, 10.0);
        assert_eq!(timer.advance(1000.0), 100);
        assert_eq!(timer.remaining_ms, 0.0);
        assert!((timer.last_advance_ms - 30.0).abs() < 0.001);
        assert_eq!(timer.advance(10.0), 0);
    }

    #[test]
    fn test_reverse_mirrors_remaining_time() {
        let mut timer = AnimationTimer::new(300.0, 10.0);
        timer.advance(100.0);
        timer.reverse();
        assert!((timer.remaining_ms - 100.0).abs() < 0.001);

        let mut fresh = AnimationTimer::new(300.0, 10.0);
        fresh.reverse();
        assert!(fresh.is_running());
        assert!((fresh.remaining_ms - EPSILON_MS).abs() < 1e-6);
    }

    #[test]
    fn test_progress() {
        assert!((progress(190.0, 200.0, 10.0, false)).abs() < 0.001);
        assert!((progress(95.0, 200.0, 10.0, false) - 0.5).abs() < 0.001);
        assert!((progress(0.0, 200.0, 10.0, false) - 1.0).abs() < 0.001);
        assert!((progress(0.0, 200.0, 10.0, true)).abs() < 0.001);
        assert!((progress(95.0, 200.0, 10.0, true) - 0.5).abs() < 0.001);
        // degenerate single-step run
        assert_eq!(progress(10.0, 10.0, 10.0, false), 1.0);
    }

    #[test]
    fn test_reversal_keeps_visual_position() {
        let mut timer = AnimationTimer::new(210.0, 10.0);
        timer.advance(70.0);
        let before = timer.progress(true);
        timer.reverse();
        let after = timer.progress(false);
        // one step of slack from the excluded first step
        assert!((before - after).abs() <= 10.0 / 200.0 + 0.001);
    }
}
