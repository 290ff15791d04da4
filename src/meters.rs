//! Thread-safe metering for real-time audio processing.
//!
//! `MeterBank` owns the four smoothed RMS readings on the audio thread and
//! publishes them into `Meters`, which the editor polls from its timer.
//! Values travel as f32 bits in atomics, so neither side ever waits.

use crate::dsp::level_meter::{SmoothedLevel, METER_SMOOTHING_SECONDS};
use crate::dsp::utils::METER_FLOOR_DB;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeterId {
    InputL,
    InputR,
    OutputL,
    OutputR,
}

impl MeterId {
    pub const ALL: [MeterId; 4] = [
        MeterId::InputL,
        MeterId::InputR,
        MeterId::OutputL,
        MeterId::OutputR,
    ];
    const INPUTS: [MeterId; 2] = [MeterId::InputL, MeterId::InputR];
    const OUTPUTS: [MeterId; 2] = [MeterId::OutputL, MeterId::OutputR];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Shared readout of the meter levels (dB) and the processed bypass state.
pub struct Meters {
    levels: [AtomicU32; 4],
    bypassed: AtomicBool,
}

impl Default for Meters {
    fn default() -> Self {
        Self::new()
    }
}

impl Meters {
    pub fn new() -> Self {
        let floor = METER_FLOOR_DB.to_bits();
        Self {
            levels: [
                AtomicU32::new(floor),
                AtomicU32::new(floor),
                AtomicU32::new(floor),
                AtomicU32::new(floor),
            ],
            bypassed: AtomicBool::new(false),
        }
    }

    pub fn set_level(&self, id: MeterId, db: f32) {
        self.levels[id.index()].store(db.to_bits(), Ordering::Relaxed);
    }

    pub fn level(&self, id: MeterId) -> f32 {
        f32::from_bits(self.levels[id.index()].load(Ordering::Relaxed))
    }

    pub fn set_bypassed(&self, bypassed: bool) {
        self.bypassed.store(bypassed, Ordering::Relaxed);
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed.load(Ordering::Relaxed)
    }
}

/// The four smoothed readings (in L/R, out L/R), owned by the audio thread.
pub struct MeterBank {
    levels: [SmoothedLevel; 4],
    shared: Arc<Meters>,
}

impl MeterBank {
    pub fn new(shared: Arc<Meters>) -> Self {
        Self {
            levels: [SmoothedLevel::new(); 4],
            shared,
        }
    }

    pub fn reset(&mut self, sample_rate: f32) {
        for level in self.levels.iter_mut() {
            level.reset(sample_rate, METER_SMOOTHING_SECONDS);
        }
        self.publish_all();
    }

    /// Measure the block at the pre-compression point. Channels beyond the
    /// second are not metered; a missing right channel keeps its reading.
    pub fn observe_input(&mut self, channels: &[&mut [f32]]) {
        self.observe(MeterId::INPUTS, channels);
    }

    pub fn observe_output(&mut self, channels: &[&mut [f32]]) {
        self.observe(MeterId::OUTPUTS, channels);
    }

    fn observe(&mut self, ids: [MeterId; 2], channels: &[&mut [f32]]) {
        for (id, channel) in ids.into_iter().zip(channels.iter()) {
            let level = &mut self.levels[id.index()];
            level.observe(channel);
            self.shared.set_level(id, level.current_value());
        }
    }

    /// Drop all four readings to the floor at once.
    pub fn force_floor(&mut self) {
        for level in self.levels.iter_mut() {
            level.force_floor();
        }
        self.publish_all();
    }

    fn publish_all(&self) {
        for id in MeterId::ALL {
            self.shared
                .set_level(id, self.levels[id.index()].current_value());
        }
    }

    pub fn level(&self, id: MeterId) -> f32 {
        self.levels[id.index()].current_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_starts_at_floor() {
        let meters = Meters::new();
        for id in MeterId::ALL {
            assert_eq!(meters.level(id), METER_FLOOR_DB);
        }
        assert!(!meters.is_bypassed());
    }

    #[test]
    fn observations_are_published() {
        let shared = Arc::new(Meters::new());
        let mut bank = MeterBank::new(shared.clone());
        bank.reset(48000.0);

        let mut left = vec![0.5f32; 256];
        let mut right = vec![0.25f32; 256];
        let channels = [left.as_mut_slice(), right.as_mut_slice()];
        bank.observe_input(&channels);

        assert!((shared.level(MeterId::InputL) + 6.02).abs() < 0.01);
        assert!((shared.level(MeterId::InputR) + 12.04).abs() < 0.01);
        assert_eq!(shared.level(MeterId::OutputL), METER_FLOOR_DB);
        assert_eq!(bank.level(MeterId::InputL), shared.level(MeterId::InputL));
    }

    #[test]
    fn mono_leaves_right_meter_alone() {
        let shared = Arc::new(Meters::new());
        let mut bank = MeterBank::new(shared.clone());
        bank.reset(48000.0);

        let mut mono = vec![1.0f32; 128];
        let channels = [mono.as_mut_slice()];
        bank.observe_output(&channels);

        assert!(shared.level(MeterId::OutputL).abs() < 1e-4);
        assert_eq!(shared.level(MeterId::OutputR), METER_FLOOR_DB);
    }

    #[test]
    fn force_floor_publishes_immediately() {
        let shared = Arc::new(Meters::new());
        let mut bank = MeterBank::new(shared.clone());
        bank.reset(48000.0);

        let mut left = vec![0.9f32; 64];
        let mut right = vec![0.9f32; 64];
        let channels = [left.as_mut_slice(), right.as_mut_slice()];
        bank.observe_input(&channels);
        bank.observe_output(&channels);

        bank.force_floor();
        for id in MeterId::ALL {
            assert_eq!(shared.level(id), METER_FLOOR_DB);
        }
    }
}
