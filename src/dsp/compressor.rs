//! Feed-Forward Compressor
//!
//! # Perceptual Contract
//! - **Target Source**: Any stereo or mono program material.
//! - **Intended Effect**: Reduce level above the threshold by the chosen ratio.
//! - **Failure Modes**:
//!   - Audible distortion of low frequencies with very short attack/release
//!     (the detector follows individual waveform peaks).
//!   - "Pumping" with short release and heavy reduction.
//! - **Will Not Do**:
//!   - Makeup gain (the output gain stage owns that).
//!   - Lookahead or soft knee.
//!
//! # Topology
//! 1. **Detector**: instantaneous peak level in dB, per channel.
//! 2. **Gain Computer**: hard knee. Reduction = (level - threshold) * (1 - 1/ratio)
//!    above the threshold, zero below.
//! 3. **Gain Smoother**: one-pole on the reduction, attack coefficient while the
//!    reduction grows and release coefficient while it recovers.
//!
//! Channels are not linked. With a ratio of 1 the stage is an exact identity.

use crate::dsp::utils::{db_to_lin, lin_to_db, time_constant_coeff};

/// Channels with their own detector. Further channels pass through.
pub const MAX_CHANNELS: usize = 2;

/// Static compressor configuration. Always applied as a whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressorSettings {
    pub attack_ms: f32,
    pub release_ms: f32,
    pub threshold_db: f32,
    pub ratio: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            attack_ms: 50.0,
            release_ms: 250.0,
            threshold_db: 0.0,
            ratio: 1.0,
        }
    }
}

impl CompressorSettings {
    /// Static curve: reduction in dB (positive) for a detector level.
    #[inline]
    pub fn reduction_db(&self, level_db: f32) -> f32 {
        let over_db = level_db - self.threshold_db;
        if over_db > 0.0 {
            over_db * (1.0 - 1.0 / self.ratio.max(1.0))
        } else {
            0.0
        }
    }
}

pub struct Compressor {
    settings: CompressorSettings,
    sample_rate: f32,
    attack_coeff: f32,
    release_coeff: f32,

    // Smoothed gain reduction (dB, positive) per channel
    gain_reduction_db: [f32; MAX_CHANNELS],
}

impl Compressor {
    pub fn new(sample_rate: f32) -> Self {
        let mut compressor = Self {
            settings: CompressorSettings::default(),
            sample_rate,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            gain_reduction_db: [0.0; MAX_CHANNELS],
        };
        compressor.update_coeffs();
        compressor
    }

    pub fn reset(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coeffs();
        self.gain_reduction_db = [0.0; MAX_CHANNELS];
    }

    /// Swap in new settings. Coefficients are only recomputed when something changed.
    pub fn configure(&mut self, settings: CompressorSettings) {
        if settings == self.settings {
            return;
        }
        self.settings = settings;
        self.update_coeffs();
    }

    fn update_coeffs(&mut self) {
        self.attack_coeff = time_constant_coeff(self.settings.attack_ms, self.sample_rate);
        self.release_coeff = time_constant_coeff(self.settings.release_ms, self.sample_rate);
    }

    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        let settings = self.settings;
        let (atk, rel) = (self.attack_coeff, self.release_coeff);

        for (channel, gr_db) in channels.iter_mut().zip(self.gain_reduction_db.iter_mut()) {
            for sample in channel.iter_mut() {
                let target_db = settings.reduction_db(lin_to_db(sample.abs()));

                let coeff = if target_db > *gr_db { atk } else { rel };
                *gr_db = coeff * *gr_db + (1.0 - coeff) * target_db;

                if *gr_db > 0.0 {
                    *sample *= db_to_lin(-*gr_db);
                }
            }
        }
    }

    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn settings(threshold_db: f32, ratio: f32) -> CompressorSettings {
        CompressorSettings {
            attack_ms: 5.0,
            release_ms: 50.0,
            threshold_db,
            ratio,
        }
    }

    fn process_constant(comp: &mut Compressor, level: f32, len: usize) -> Vec<f32> {
        let mut block = vec![level; len];
        {
            let mut channels = [block.as_mut_slice()];
            comp.process(&mut channels);
        }
        block
    }

    #[test]
    fn unity_ratio_is_identity() {
        let mut comp = Compressor::new(SR);
        comp.configure(settings(-60.0, 1.0));
        let mut left: Vec<f32> = (0..512).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut right = left.clone();
        let reference = left.clone();
        {
            let mut channels = [left.as_mut_slice(), right.as_mut_slice()];
            comp.process(&mut channels);
        }
        assert_eq!(left, reference);
        assert_eq!(right, reference);
    }

    #[test]
    fn below_threshold_is_untouched() {
        let mut comp = Compressor::new(SR);
        comp.configure(settings(-6.0, 4.0));
        let out = process_constant(&mut comp, 0.25, 1024); // about -12 dB
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn settles_on_static_curve() {
        let mut comp = Compressor::new(SR);
        comp.configure(settings(-20.0, 4.0));
        // 0 dB input, 20 dB over -> 15 dB of reduction
        let out = process_constant(&mut comp, 1.0, 48000);
        let settled_db = lin_to_db(*out.last().unwrap());
        assert!((settled_db + 15.0).abs() < 0.05, "settled at {settled_db}");
    }

    #[test]
    fn attack_is_gradual_and_release_recovers() {
        let mut comp = Compressor::new(SR);
        comp.configure(settings(-20.0, 10.0));

        let onset = process_constant(&mut comp, 1.0, 4800);
        assert!(onset[0] > onset[4799]);
        assert!(onset.windows(2).all(|w| w[1] <= w[0] + 1e-7));

        // Drop below threshold: gain must climb back toward unity
        let tail = process_constant(&mut comp, 0.01, 48000);
        assert!(tail[0] < 0.01);
        assert!((tail[47999] - 0.01).abs() < 1e-4);
    }

    #[test]
    fn configure_swaps_all_fields() {
        let mut comp = Compressor::new(SR);
        let s = CompressorSettings {
            attack_ms: 10.0,
            release_ms: 300.0,
            threshold_db: -30.0,
            ratio: 8.0,
        };
        comp.configure(s);
        assert_eq!(comp.settings(), s);
    }
}
