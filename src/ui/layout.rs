//! Layout builders for the compressor editor
//!
//! - Header with title and the A/B (bypass) toggle
//! - Body with the waveform on the left, gains and meters on the right
//! - Footer with the compressor controls

use crate::debug::EventLog;
use crate::meters::{MeterId, Meters};
use crate::ui::meters::{LevelMeter, WaveformView};
use crate::ui::state::{EditorData, EditorEvent};
use crate::waveform::WaveformHistory;
use crate::CompressorParams;
use nih_plug::prelude::Param;
use nih_plug_vizia::vizia::prelude::*;
use nih_plug_vizia::widgets::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const STYLE: &str = include_str!("../ui.css");

const REFRESH_INTERVAL: Duration = Duration::from_micros(16_667);

fn build_param_row<P, FMap>(cx: &mut Context, label: &'static str, map: FMap)
where
    P: Param + 'static,
    FMap: Fn(&Arc<CompressorParams>) -> &P + Copy + 'static,
{
    VStack::new(cx, move |cx| {
        Label::new(cx, label).class("slider-label");
        ParamSlider::new(cx, EditorData::params, move |p| map(p)).class("param-slider");
    })
    .class("param-row");
}

fn build_meter_pair(cx: &mut Context, label: &'static str, meters: Arc<Meters>, ids: [MeterId; 2]) {
    VStack::new(cx, move |cx| {
        Label::new(cx, label).class("meter-label");
        HStack::new(cx, move |cx| {
            for id in ids {
                LevelMeter::new(cx, meters.clone(), id);
            }
        })
        .class("meter-bars");
    })
    .class("meter-pair");
}

pub fn build_header(cx: &mut Context) -> Handle<'_, HStack> {
    HStack::new(cx, |cx| {
        Label::new(cx, "BASIC COMPRESSOR").class("header-title");
        Element::new(cx).width(Stretch(1.0));
        ParamButton::new(cx, EditorData::params, |p| &p.bypass)
            .with_label("A/B")
            .class("bypass-button");
    })
    .class("header")
}

pub fn build_body(
    cx: &mut Context,
    params: Arc<CompressorParams>,
    meters: Arc<Meters>,
    waveform: Arc<Mutex<WaveformHistory>>,
) -> Handle<'_, HStack> {
    HStack::new(cx, move |cx| {
        let meters_wave = meters.clone();
        let params_wave = params.clone();
        let waveform_view = waveform.clone();
        VStack::new(cx, move |cx| {
            WaveformView::new(cx, waveform_view.clone(), meters_wave.clone(), params_wave.clone())
                .class("waveform");

            HStack::new(cx, |cx| {
                Label::new(cx, "Zoom").class("slider-label");
                Slider::new(cx, EditorData::wave_zoom)
                    .on_changing(|cx, zoom| cx.emit(EditorEvent::SetWaveZoom(zoom)))
                    .class("zoom-slider");
            })
            .class("zoom-row");
        })
        .class("wave-column");

        let meters_side = meters.clone();
        VStack::new(cx, move |cx| {
            build_param_row(cx, "Input Gain", |p| &p.input_gain);
            build_param_row(cx, "Output Gain", |p| &p.output_gain);

            let meters_pairs = meters_side.clone();
            HStack::new(cx, move |cx| {
                build_meter_pair(
                    cx,
                    "IN",
                    meters_pairs.clone(),
                    [MeterId::InputL, MeterId::InputR],
                );
                build_meter_pair(
                    cx,
                    "OUT",
                    meters_pairs.clone(),
                    [MeterId::OutputL, MeterId::OutputR],
                );
            })
            .class("meter-group");
        })
        .class("side-column");
    })
    .class("body")
}

pub fn build_footer(cx: &mut Context) -> Handle<'_, HStack> {
    HStack::new(cx, |cx| {
        build_param_row(cx, "Attack", |p| &p.attack);
        build_param_row(cx, "Release", |p| &p.release);
        build_param_row(cx, "Threshold", |p| &p.threshold);
        build_param_row(cx, "Ratio", |p| &p.ratio);
    })
    .class("footer")
}

// --- MAIN VIEW BUILDER ---

pub fn build_ui(
    cx: &mut Context,
    params: Arc<CompressorParams>,
    meters: Arc<Meters>,
    waveform: Arc<Mutex<WaveformHistory>>,
    event_log: Arc<Mutex<EventLog>>,
) {
    if let Err(e) = cx.add_stylesheet(STYLE) {
        log::error!("editor stylesheet failed to load: {e:?}");
    }

    EditorData::new(params.clone(), waveform.clone()).build(cx);

    // Pull whatever the audio thread produced since the last frame
    let waveform_timer = waveform.clone();
    let timer = cx.add_timer(REFRESH_INTERVAL, None, move |cx, action| {
        if let TimerAction::Tick(_) = action {
            if let Ok(mut history) = waveform_timer.lock() {
                history.drain();
            }
            if let Ok(mut events) = event_log.lock() {
                events.drain_to_log();
            }
            cx.needs_redraw();
        }
    });
    cx.start_timer(timer);

    VStack::new(cx, move |cx| {
        build_header(cx);
        build_body(cx, params.clone(), meters.clone(), waveform.clone());
        build_footer(cx);
    })
    .class("app-root");

    log::debug!("editor opened");
}
