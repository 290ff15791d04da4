//! Ramped Gain Stage
//!
//! Decibel-specified gain applied through a 50 ms linear ramp in the
//! amplitude domain, so automation and knob moves never click. Used twice
//! in the chain: before the compressor (input trim) and after it (makeup).
//!
//! # Lifecycle
//! - `reset` arms the stage; the next `configure` jumps straight to its
//!   target. Every later `configure` ramps.

use crate::dsp::smoothing::LinearRamp;
use crate::dsp::utils::{db_to_lin, lin_to_db};

/// Length of a gain change.
pub const GAIN_RAMP_SECONDS: f32 = 0.05;

pub struct RampedGain {
    ramp: LinearRamp,
    target_db: f32,
    primed: bool,
}

impl Default for RampedGain {
    fn default() -> Self {
        Self::new()
    }
}

impl RampedGain {
    pub fn new() -> Self {
        Self {
            ramp: LinearRamp::new(1.0),
            target_db: 0.0,
            primed: false,
        }
    }

    pub fn reset(&mut self, sample_rate: f32) {
        self.ramp.reset(sample_rate, GAIN_RAMP_SECONDS);
        self.primed = false;
    }

    pub fn configure(&mut self, target_db: f32) {
        self.target_db = target_db;
        let target = db_to_lin(target_db);
        if self.primed {
            self.ramp.set_target(target);
        } else {
            self.ramp.set_current_and_target(target);
            self.primed = true;
        }
    }

    /// Apply the gain in place. All channels share the same ramp position.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        if !self.ramp.is_smoothing() {
            let gain = self.ramp.current();
            if gain == 1.0 {
                return;
            }
            for channel in channels.iter_mut() {
                for sample in channel.iter_mut() {
                    *sample *= gain;
                }
            }
            return;
        }

        let num_samples = channels.first().map_or(0, |c| c.len());
        for i in 0..num_samples {
            let gain = self.ramp.next();
            for channel in channels.iter_mut() {
                channel[i] *= gain;
            }
        }
    }

    pub fn current_gain_db(&self) -> f32 {
        lin_to_db(self.ramp.current())
    }

    pub fn target_gain_db(&self) -> f32 {
        self.target_db
    }

    pub fn is_ramping(&self) -> bool {
        self.ramp.is_smoothing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn run(gain: &mut RampedGain, len: usize) -> Vec<f32> {
        let mut block = vec![1.0f32; len];
        {
            let mut channels = [block.as_mut_slice()];
            gain.process(&mut channels);
        }
        block
    }

    #[test]
    fn first_configure_jumps() {
        let mut gain = RampedGain::new();
        gain.reset(SR);
        gain.configure(-6.0);
        assert!(!gain.is_ramping());
        assert!((gain.current_gain_db() + 6.0).abs() < 1e-4);
    }

    #[test]
    fn converges_within_ramp_duration_without_overshoot() {
        let mut gain = RampedGain::new();
        gain.reset(SR);
        gain.configure(0.0);
        gain.configure(6.0);

        let ramp_len = (GAIN_RAMP_SECONDS * SR) as usize;
        let out = run(&mut gain, ramp_len + 100);
        let upper = db_to_lin(6.0);

        let mut prev = 1.0;
        for &g in &out {
            assert!(g <= upper + 1e-6);
            assert!(g >= prev - 1e-6);
            prev = g;
        }
        assert!((out[ramp_len - 1] - upper).abs() < 1e-6);
        assert!((gain.current_gain_db() - 6.0).abs() < 1e-3);
    }

    #[test]
    fn repeated_unity_is_untouched() {
        let mut gain = RampedGain::new();
        gain.reset(SR);
        gain.configure(0.0);
        gain.configure(0.0);
        assert!(!gain.is_ramping());
        assert!(run(&mut gain, 512).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn retarget_mid_ramp_has_no_step() {
        let mut gain = RampedGain::new();
        gain.reset(SR);
        gain.configure(0.0);
        gain.configure(12.0);
        let first = run(&mut gain, 600);
        gain.configure(-12.0);
        let second = run(&mut gain, 600);

        let jump = (second[0] - first[599]).abs();
        let max_step = (db_to_lin(12.0) - db_to_lin(-12.0)) / (GAIN_RAMP_SECONDS * SR);
        assert!(jump <= max_step + 1e-5);
    }
}
