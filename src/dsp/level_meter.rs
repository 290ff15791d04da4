//! Smoothed RMS Level
//!
//! Per-channel, per-block RMS reading in dB for the UI meters.
//!
//! # Ballistics
//! - **Attack**: instant. A reading at or above the displayed value replaces it.
//! - **Release**: a lower reading becomes the new target and the displayed
//!   value glides down to it linearly over the smoothing time.
//!
//! Time advances by the length of each observed block before the new reading
//! is compared, so the fall rate does not depend on the host's block size.

use crate::dsp::smoothing::LinearRamp;
use crate::dsp::utils::{channel_rms, lin_to_db, METER_FLOOR_DB};

/// Release time of the meters.
pub const METER_SMOOTHING_SECONDS: f32 = 0.75;

#[derive(Clone, Copy, Debug)]
pub struct SmoothedLevel {
    level: LinearRamp,
    sample_rate: f32,
    smoothing_seconds: f32,
}

impl Default for SmoothedLevel {
    fn default() -> Self {
        Self::new()
    }
}

impl SmoothedLevel {
    pub fn new() -> Self {
        Self {
            level: LinearRamp::new(METER_FLOOR_DB),
            sample_rate: 0.0,
            smoothing_seconds: METER_SMOOTHING_SECONDS,
        }
    }

    /// Reinitialise for a new playback session. Starts at the floor so the
    /// meter does not pop on start.
    pub fn reset(&mut self, sample_rate: f32, smoothing_seconds: f32) {
        self.sample_rate = sample_rate;
        self.smoothing_seconds = smoothing_seconds;
        self.level.reset(sample_rate, smoothing_seconds);
        self.level.set_current_and_target(METER_FLOOR_DB);
    }

    /// Fold one block of a channel into the reading. Empty blocks are ignored.
    pub fn observe(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        self.level.skip(samples.len());

        let value = lin_to_db(channel_rms(samples));
        if value < self.level.current() {
            self.level.set_target(value);
        } else {
            self.level.set_current_and_target(value);
        }
    }

    /// Park the reading at the floor without any glide.
    pub fn force_floor(&mut self) {
        self.level.set_current_and_target(METER_FLOOR_DB);
    }

    #[inline]
    pub fn current_value(&self) -> f32 {
        self.level.current()
    }

    #[inline]
    pub fn target_value(&self) -> f32 {
        self.level.target()
    }

    pub fn smoothing_seconds(&self) -> f32 {
        self.smoothing_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::utils::db_to_lin;

    const SR: f32 = 48000.0;

    fn meter() -> SmoothedLevel {
        let mut m = SmoothedLevel::new();
        m.reset(SR, METER_SMOOTHING_SECONDS);
        m
    }

    fn block_at(db: f32, len: usize) -> Vec<f32> {
        vec![db_to_lin(db); len]
    }

    #[test]
    fn starts_at_floor() {
        let m = meter();
        assert_eq!(m.current_value(), METER_FLOOR_DB);
        assert_eq!(m.target_value(), METER_FLOOR_DB);
    }

    #[test]
    fn silence_reads_floor_after_one_call() {
        let mut m = meter();
        m.observe(&[0.0; 512]);
        assert_eq!(m.current_value(), METER_FLOOR_DB);
    }

    #[test]
    fn empty_block_is_a_no_op() {
        let mut m = meter();
        m.observe(&block_at(-20.0, 512));
        m.observe(&block_at(-40.0, 512));
        let (current, target) = (m.current_value(), m.target_value());
        m.observe(&[]);
        assert_eq!(m.current_value(), current);
        assert_eq!(m.target_value(), target);
    }

    #[test]
    fn attack_is_instant() {
        let mut m = meter();
        m.observe(&block_at(-30.0, 256));
        assert!((m.current_value() + 30.0).abs() < 1e-3);

        for _ in 0..4 {
            m.observe(&[0.0; 256]);
        }
        m.observe(&block_at(-6.0, 256));
        assert!((m.current_value() + 6.0).abs() < 1e-3);
    }

    #[test]
    fn release_glides_without_undershoot() {
        let mut m = meter();
        m.observe(&block_at(-6.0, 512));

        let mut last = m.current_value();
        let mut levels = (0..40).map(|i| -8.0 - i as f32 * 1.5);
        for db in &mut levels {
            m.observe(&block_at(db, 512));
            let v = m.current_value();
            assert!(v <= last + 1e-4, "rose from {last} to {v}");
            assert!(v >= m.target_value() - 1e-4, "undershot target");
            last = v;
        }
        // A slow glide, not a jump
        assert!(m.current_value() > -30.0);
    }

    #[test]
    fn release_reaches_silence_within_smoothing_time() {
        let mut m = meter();
        m.observe(&block_at(-12.0, 480));
        // 0.75 s at 48 kHz = 75 blocks of 480
        for _ in 0..74 {
            m.observe(&[0.0; 480]);
        }
        assert!(m.current_value() > METER_FLOOR_DB);
        m.observe(&[0.0; 480]);
        m.observe(&[0.0; 480]);
        assert_eq!(m.current_value(), METER_FLOOR_DB);
    }

    #[test]
    fn variable_block_sizes_fall_at_the_same_rate() {
        let mut a = meter();
        let mut b = meter();
        a.observe(&block_at(-10.0, 64));
        b.observe(&block_at(-10.0, 64));

        a.observe(&[0.0; 64]); // sets target
        b.observe(&[0.0; 64]);
        for _ in 0..8 {
            a.observe(&[0.0; 256]);
        }
        for _ in 0..2 {
            b.observe(&[0.0; 1024]);
        }
        assert!((a.current_value() - b.current_value()).abs() < 1e-3);
    }

    #[test]
    fn force_floor_is_immediate() {
        let mut m = meter();
        m.observe(&block_at(-3.0, 512));
        m.force_floor();
        assert_eq!(m.current_value(), METER_FLOOR_DB);
        assert_eq!(m.target_value(), METER_FLOOR_DB);
    }
}
