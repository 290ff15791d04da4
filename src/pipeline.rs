//! Per-block processing chain.
//!
//! # Signal Flow (ACTIVE)
//! input gain -> input meters -> compressor -> waveform tap -> output gain -> output meters
//!
//! # BYPASSED
//! The block is left untouched, the raw samples feed the waveform and all four
//! meters are parked at the floor in the same call. Switching between the two
//! states is a hard cut with no crossfade.
//!
//! Every stage is reconfigured from the snapshot on every block, bypassed or
//! not, so a stage never comes back from bypass with stale settings.

use crate::debug::{EventSender, PipelineEvent};
use crate::dsp::{Compressor, CompressorSettings, RampedGain};
use crate::meters::{MeterBank, Meters};
use crate::waveform::WaveformTap;
use std::sync::Arc;

const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Control values for one block. Read once from the parameter store and
/// never changed while the block is processed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterSet {
    pub attack_ms: f32,
    pub release_ms: f32,
    pub threshold_db: f32,
    pub ratio: f32,
    pub input_gain_db: f32,
    pub output_gain_db: f32,
    pub bypass: bool,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            attack_ms: 50.0,
            release_ms: 250.0,
            threshold_db: 0.0,
            ratio: 1.0,
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            bypass: false,
        }
    }
}

impl ParameterSet {
    pub fn compressor_settings(&self) -> CompressorSettings {
        CompressorSettings {
            attack_ms: self.attack_ms,
            release_ms: self.release_ms,
            threshold_db: self.threshold_db,
            ratio: self.ratio,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Active,
    Bypassed,
}

pub struct BlockPipeline {
    input_gain: RampedGain,
    compressor: Compressor,
    output_gain: RampedGain,
    meters: MeterBank,
    shared: Arc<Meters>,
    waveform: WaveformTap,
    events: EventSender,
    state: PipelineState,
}

impl BlockPipeline {
    pub fn new(shared: Arc<Meters>, waveform: WaveformTap, events: EventSender) -> Self {
        Self {
            input_gain: RampedGain::new(),
            compressor: Compressor::new(DEFAULT_SAMPLE_RATE),
            output_gain: RampedGain::new(),
            meters: MeterBank::new(shared.clone()),
            shared,
            waveform,
            events,
            state: PipelineState::Active,
        }
    }

    /// Start a new playback session. Meters drop to the floor, the
    /// compressor forgets its envelope and the gains snap on the next block.
    pub fn reset(&mut self, sample_rate: f32) {
        self.input_gain.reset(sample_rate);
        self.output_gain.reset(sample_rate);
        self.compressor.reset(sample_rate);
        self.meters.reset(sample_rate);
        self.waveform.clear();
        self.events.post(PipelineEvent::Reset { sample_rate });
    }

    /// Process one block in place. Channels must share a length; any length,
    /// including zero, is accepted.
    pub fn process(&mut self, channels: &mut [&mut [f32]], params: &ParameterSet) {
        self.input_gain.configure(params.input_gain_db);
        self.compressor.configure(params.compressor_settings());
        self.output_gain.configure(params.output_gain_db);

        let state = if params.bypass {
            PipelineState::Bypassed
        } else {
            PipelineState::Active
        };

        match state {
            PipelineState::Active => {
                self.input_gain.process(channels);
                self.meters.observe_input(channels);
                self.compressor.process(channels);
                self.waveform.push_block(channels);
                self.output_gain.process(channels);
                self.meters.observe_output(channels);
            }
            PipelineState::Bypassed => {
                self.waveform.push_block(channels);
                self.meters.force_floor();
            }
        }

        if state != self.state {
            self.events.post(match state {
                PipelineState::Active => PipelineEvent::Activated,
                PipelineState::Bypassed => PipelineEvent::Bypassed,
            });
            self.state = state;
        }
        self.shared.set_bypassed(state == PipelineState::Bypassed);
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn meters(&self) -> &MeterBank {
        &self.meters
    }
}
