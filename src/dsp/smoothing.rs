//! Linear Ramp (Control Smoothing)
//!
//! Moves a control value to a new target along a straight line of a fixed
//! number of samples. Shared by the gain stages (linear amplitude, advanced
//! per sample) and the level meters (decibels, advanced per block).
//!
//! Retargeting mid-ramp starts a new segment from wherever the value is now,
//! so the output never jumps. The only jumps are explicit ones via
//! `set_current_and_target`.

#[derive(Clone, Copy, Debug)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    step: f32,
    /// Samples left in the active segment
    countdown: usize,
    steps_to_target: usize,
}

impl LinearRamp {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            countdown: 0,
            steps_to_target: 0,
        }
    }

    /// Set the ramp length for a sample rate and snap to the current target.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        self.steps_to_target = (ramp_seconds * sample_rate).max(0.0).floor() as usize;
        self.set_current_and_target(self.target);
    }

    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.countdown = 0;
    }

    /// Start a new segment toward `value`. Repeating the current target is a no-op.
    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }
        if self.steps_to_target == 0 {
            self.set_current_and_target(value);
            return;
        }

        self.target = value;
        self.countdown = self.steps_to_target;
        self.step = (self.target - self.current) / self.countdown as f32;
    }

    /// Advance one sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }

        self.countdown -= 1;
        if self.countdown == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }
        self.current
    }

    /// Advance `num_samples` at once. Lands exactly on the target when the
    /// segment would finish inside the skipped span.
    pub fn skip(&mut self, num_samples: usize) -> f32 {
        if num_samples >= self.countdown {
            self.set_current_and_target(self.target);
            return self.target;
        }

        self.current += self.step * num_samples as f32;
        self.countdown -= num_samples;
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_target_after_ramp_length() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.reset(20.0, 0.5); // 10 steps
        ramp.set_target(1.0);

        let mut last = 0.0;
        for _ in 0..9 {
            let v = ramp.next();
            assert!(v > last && v < 1.0);
            last = v;
        }
        assert_eq!(ramp.next(), 1.0);
        assert!(!ramp.is_smoothing());
    }

    #[test]
    fn skip_past_the_end_lands_on_target() {
        let mut ramp = LinearRamp::new(-10.0);
        ramp.reset(200.0, 0.5);
        ramp.set_target(-20.0);

        let mid = ramp.skip(50);
        assert!((mid + 15.0).abs() < 1e-4);
        assert_eq!(ramp.skip(500), -20.0);
        assert_eq!(ramp.current(), -20.0);
    }

    #[test]
    fn repeating_the_target_keeps_the_segment() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.reset(100.0, 1.0);
        ramp.set_target(1.0);
        ramp.skip(50);
        ramp.set_target(1.0);
        // Still halfway, not restarted from the current value
        assert!((ramp.skip(50) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_length_ramp_snaps() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.reset(48000.0, 0.0);
        ramp.set_target(3.0);
        assert_eq!(ramp.current(), 3.0);
        assert!(!ramp.is_smoothing());
    }

    #[test]
    fn retarget_mid_ramp_is_continuous() {
        let mut ramp = LinearRamp::new(0.0);
        ramp.reset(100.0, 1.0);
        ramp.set_target(1.0);
        let before = ramp.skip(30);
        ramp.set_target(0.0);
        let after = ramp.next();
        assert!((after - before).abs() < 0.02);
    }
}
