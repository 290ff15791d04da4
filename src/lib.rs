pub mod debug;
pub mod dsp;
pub mod meters;
pub mod pipeline;
mod ui;
pub mod waveform;

use crate::debug::{event_queue, EventLog};
use crate::meters::Meters;
use crate::pipeline::{BlockPipeline, ParameterSet};
use crate::waveform::{waveform_feed, WaveformHistory};
use nih_plug::prelude::*;
use nih_plug_vizia::{create_vizia_editor, ViziaState, ViziaTheming};
use std::sync::{Arc, Mutex};
use ui::build_ui;

// -----------------------------------------------------------------------------
// RATIO CHOICES
// -----------------------------------------------------------------------------

/// The fixed set of compression ratios offered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[repr(usize)]
pub enum Ratio {
    #[name = "1.0"]
    Unity,
    #[name = "1.5"]
    OneAndHalf,
    #[name = "2.0"]
    Two,
    #[name = "3.0"]
    Three,
    #[name = "4.0"]
    Four,
    #[name = "5.0"]
    Five,
    #[name = "6.0"]
    Six,
    #[name = "7.0"]
    Seven,
    #[name = "8.0"]
    Eight,
    #[name = "9.0"]
    Nine,
    #[name = "10.0"]
    Ten,
    #[name = "15.0"]
    Fifteen,
    #[name = "20.0"]
    Twenty,
    #[name = "25.0"]
    TwentyFive,
    #[name = "50.0"]
    Fifty,
    #[name = "100.0"]
    Hundred,
}

impl Ratio {
    pub const ALL: [Ratio; 16] = [
        Ratio::Unity,
        Ratio::OneAndHalf,
        Ratio::Two,
        Ratio::Three,
        Ratio::Four,
        Ratio::Five,
        Ratio::Six,
        Ratio::Seven,
        Ratio::Eight,
        Ratio::Nine,
        Ratio::Ten,
        Ratio::Fifteen,
        Ratio::Twenty,
        Ratio::TwentyFive,
        Ratio::Fifty,
        Ratio::Hundred,
    ];

    pub fn value(self) -> f32 {
        match self {
            Ratio::Unity => 1.0,
            Ratio::OneAndHalf => 1.5,
            Ratio::Two => 2.0,
            Ratio::Three => 3.0,
            Ratio::Four => 4.0,
            Ratio::Five => 5.0,
            Ratio::Six => 6.0,
            Ratio::Seven => 7.0,
            Ratio::Eight => 8.0,
            Ratio::Nine => 9.0,
            Ratio::Ten => 10.0,
            Ratio::Fifteen => 15.0,
            Ratio::Twenty => 20.0,
            Ratio::TwentyFive => 25.0,
            Ratio::Fifty => 50.0,
            Ratio::Hundred => 100.0,
        }
    }

    /// Exact lookup. Values outside the table yield `None`.
    pub fn from_value(value: f32) -> Option<Ratio> {
        Self::ALL.into_iter().find(|r| r.value() == value)
    }
}

// -----------------------------------------------------------------------------
// PARAMETERS
// -----------------------------------------------------------------------------
#[derive(Params)]
pub struct CompressorParams {
    #[persist = "editor-state"]
    editor_state: Arc<ViziaState>,

    #[id = "attack"]
    pub attack: FloatParam,

    #[id = "release"]
    pub release: FloatParam,

    #[id = "threshold"]
    pub threshold: FloatParam,

    #[id = "ratio"]
    pub ratio: EnumParam<Ratio>,

    #[id = "input_gain"]
    pub input_gain: FloatParam,

    #[id = "output_gain"]
    pub output_gain: FloatParam,

    #[id = "bypass"]
    pub bypass: BoolParam,
}

fn format_ms(v: f32) -> String {
    format!("{:.0} ms", v)
}

fn format_db(v: f32) -> String {
    format!("{:.1} dB", v)
}

fn time_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(
        name,
        default,
        FloatRange::Linear {
            min: 5.0,
            max: 500.0,
        },
    )
    .with_step_size(1.0)
    .with_value_to_string(Arc::new(format_ms))
}

fn gain_param(name: &str) -> FloatParam {
    FloatParam::new(
        name,
        0.0,
        FloatRange::Linear {
            min: -24.0,
            max: 24.0,
        },
    )
    .with_step_size(0.5)
    .with_value_to_string(Arc::new(format_db))
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            editor_state: ViziaState::new(|| (600, 500)),

            attack: time_param("Attack", 50.0),
            release: time_param("Release", 250.0),

            threshold: FloatParam::new(
                "Threshold",
                0.0,
                FloatRange::Linear {
                    min: -60.0,
                    max: 20.0,
                },
            )
            .with_step_size(1.0)
            .with_value_to_string(Arc::new(format_db)),

            ratio: EnumParam::new("Ratio", Ratio::Unity),

            input_gain: gain_param("Input Gain"),
            output_gain: gain_param("Output Gain"),

            bypass: BoolParam::new("Bypass", false).make_bypass(),
        }
    }
}

impl CompressorParams {
    /// Read every control once for the coming block.
    pub fn snapshot(&self) -> ParameterSet {
        ParameterSet {
            attack_ms: self.attack.value(),
            release_ms: self.release.value(),
            threshold_db: self.threshold.value(),
            ratio: self.ratio.value().value(),
            input_gain_db: self.input_gain.value(),
            output_gain_db: self.output_gain.value(),
            bypass: self.bypass.value(),
        }
    }
}

// -----------------------------------------------------------------------------
// PLUGIN STRUCT
// -----------------------------------------------------------------------------
pub struct BasicCompressor {
    params: Arc<CompressorParams>,
    pipeline: BlockPipeline,
    sample_rate: f32,

    // Editor-side ends of the audio thread feeds
    meters: Arc<Meters>,
    waveform: Arc<Mutex<WaveformHistory>>,
    event_log: Arc<Mutex<EventLog>>,
}

impl Default for BasicCompressor {
    fn default() -> Self {
        let meters = Arc::new(Meters::new());
        let (tap, history) = waveform_feed();
        let (events, event_log) = event_queue();

        Self {
            params: Arc::new(CompressorParams::default()),
            pipeline: BlockPipeline::new(meters.clone(), tap, events),
            sample_rate: 44100.0,
            meters,
            waveform: Arc::new(Mutex::new(history)),
            event_log: Arc::new(Mutex::new(event_log)),
        }
    }
}

impl Plugin for BasicCompressor {
    const NAME: &'static str = "Basic Compressor";
    const VENDOR: &'static str = "Basic Compressor";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        self.sample_rate = buffer_config.sample_rate;
        self.pipeline.reset(self.sample_rate);

        log::info!(
            "initialized: {} Hz, {} channels, max block {}",
            self.sample_rate,
            audio_io_layout
                .main_output_channels
                .map(NonZeroU32::get)
                .unwrap_or(0),
            buffer_config.max_buffer_size
        );
        true
    }

    fn reset(&mut self) {
        self.pipeline.reset(self.sample_rate);
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        let params = self.params.clone();
        let meters = self.meters.clone();
        let waveform = self.waveform.clone();
        let event_log = self.event_log.clone();
        create_vizia_editor(
            self.params.editor_state.clone(),
            ViziaTheming::default(),
            move |cx, _gui_context| {
                build_ui(
                    cx,
                    params.clone(),
                    meters.clone(),
                    waveform.clone(),
                    event_log.clone(),
                );
            },
        )
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let params = self.params.snapshot();
        self.pipeline.process(buffer.as_slice(), &params);
        ProcessStatus::Normal
    }
}

impl ClapPlugin for BasicCompressor {
    const CLAP_ID: &'static str = "com.basic-compressor.compressor";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Compressor with input and output gain staging");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Compressor,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for BasicCompressor {
    const VST3_CLASS_ID: [u8; 16] = *b"BasicCompressor1";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Dynamics];
}

nih_export_clap!(BasicCompressor);
nih_export_vst3!(BasicCompressor);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_table_matches_display_names() {
        for ratio in Ratio::ALL {
            let name = Ratio::variants()[ratio.to_index()];
            assert_eq!(name, format!("{:.1}", ratio.value()));
            assert_eq!(Ratio::from_value(ratio.value()), Some(ratio));
        }
        assert_eq!(Ratio::from_value(12.0), None);
        assert_eq!(Ratio::variants().len(), Ratio::ALL.len());
    }

    #[test]
    fn ratio_order_matches_enum_index() {
        for (idx, ratio) in Ratio::ALL.into_iter().enumerate() {
            assert_eq!(ratio.to_index(), idx);
            assert_eq!(Ratio::from_index(idx), ratio);
        }
    }

    #[test]
    fn default_snapshot_is_neutral() {
        let params = CompressorParams::default();
        assert_eq!(params.snapshot(), ParameterSet::default());
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_ms(49.6), "50 ms");
        assert_eq!(format_db(-1.26), "-1.3 dB");
    }
}
