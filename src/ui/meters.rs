//! Custom Vizia widgets fed from the audio thread.
//!
//! Both widgets only read shared state; the editor timer decides when they
//! are redrawn.

use crate::meters::{MeterId, Meters};
use crate::waveform::WaveformHistory;
use crate::CompressorParams;
use nih_plug_vizia::vizia::prelude::*;
use nih_plug_vizia::vizia::vg;
use std::sync::{Arc, Mutex};

// Display range of the level meters
const METER_MIN_DB: f32 = -60.0;
const METER_MAX_DB: f32 = 6.0;

// Threshold range mapped from the midline to the edge of the waveform
const THRESHOLD_MIN_DB: f32 = -60.0;
const THRESHOLD_MAX_DB: f32 = 20.0;

/// Bar height (0..1) for a level in dB.
fn meter_fill(level_db: f32) -> f32 {
    ((level_db - METER_MIN_DB) / (METER_MAX_DB - METER_MIN_DB)).clamp(0.0, 1.0)
}

/// Distance of the threshold lines from the midline, as a fraction of half the height.
fn threshold_offset(threshold_db: f32) -> f32 {
    ((threshold_db - THRESHOLD_MIN_DB) / (THRESHOLD_MAX_DB - THRESHOLD_MIN_DB)).clamp(0.0, 1.0)
}

// ============================================================================
// LEVEL METER
// ============================================================================

pub struct LevelMeter {
    meters: Arc<Meters>,
    id: MeterId,
}

impl LevelMeter {
    pub fn new(cx: &mut Context, meters: Arc<Meters>, id: MeterId) -> Handle<'_, Self> {
        Self { meters, id }.build(cx, |_| {})
    }
}

impl View for LevelMeter {
    fn element(&self) -> Option<&'static str> {
        Some("level-meter")
    }

    fn draw(&self, cx: &mut DrawContext, canvas: &mut Canvas) {
        let b = cx.bounds();
        let norm = meter_fill(self.meters.level(self.id));

        let mut bg = vg::Path::new();
        bg.rect(b.x, b.y, b.w, b.h);
        canvas.fill_path(&bg, &vg::Paint::color(vg::Color::rgb(15, 23, 42)));
        canvas.stroke_path(
            &bg,
            &vg::Paint::color(vg::Color::rgb(51, 65, 85)).with_line_width(1.0),
        );

        if norm > 0.001 {
            let fh = b.h * norm;
            let fy = b.y + (b.h - fh);

            let mut f = vg::Path::new();
            f.rect(b.x + 1.0, fy, b.w - 2.0, fh);

            // Gradient spans the whole meter so colour tracks level, not bar length
            let paint = vg::Paint::linear_gradient(
                b.x,
                b.y + b.h,
                b.x,
                b.y,
                vg::Color::rgb(34, 197, 94),
                vg::Color::rgb(239, 68, 68),
            );
            canvas.fill_path(&f, &paint);
        }

        // 0 dB mark
        let zero_y = b.y + b.h * (1.0 - meter_fill(0.0));
        let mut mark = vg::Path::new();
        mark.move_to(b.x, zero_y);
        mark.line_to(b.x + b.w, zero_y);
        canvas.stroke_path(
            &mark,
            &vg::Paint::color(vg::Color::rgba(226, 232, 240, 160)).with_line_width(1.0),
        );

        // 6 dB ticks
        let mut ticks = vg::Path::new();
        let mut db = METER_MIN_DB + 6.0;
        while db < 0.0 {
            let y = b.y + b.h * (1.0 - meter_fill(db));
            ticks.move_to(b.x, y);
            ticks.line_to(b.x + b.w, y);
            db += 6.0;
        }
        canvas.stroke_path(
            &ticks,
            &vg::Paint::color(vg::Color::rgba(0, 0, 0, 100)).with_line_width(1.0),
        );
    }
}

// ============================================================================
// WAVEFORM
// ============================================================================

pub struct WaveformView {
    waveform: Arc<Mutex<WaveformHistory>>,
    meters: Arc<Meters>,
    params: Arc<CompressorParams>,
}

impl WaveformView {
    pub fn new(
        cx: &mut Context,
        waveform: Arc<Mutex<WaveformHistory>>,
        meters: Arc<Meters>,
        params: Arc<CompressorParams>,
    ) -> Handle<'_, Self> {
        Self {
            waveform,
            meters,
            params,
        }
        .build(cx, |_| {})
    }
}

impl View for WaveformView {
    fn element(&self) -> Option<&'static str> {
        Some("waveform")
    }

    fn draw(&self, cx: &mut DrawContext, canvas: &mut Canvas) {
        let b = cx.bounds();
        let mid = b.y + b.h / 2.0;
        let half = b.h / 2.0;

        let mut bg = vg::Path::new();
        bg.rounded_rect(b.x, b.y, b.w, b.h, 4.0);
        canvas.fill_path(&bg, &vg::Paint::color(vg::Color::rgb(15, 23, 42)));

        if let Ok(history) = self.waveform.lock() {
            let columns = history.visible_columns().max(1) as f32;
            let col_w = b.w / columns;

            let mut wave = vg::Path::new();
            for (i, column) in history.visible().enumerate() {
                let x = b.x + (i as f32 + 0.5) * col_w;
                let top = mid - column.max.clamp(-1.0, 1.0) * half;
                let bottom = mid - column.min.clamp(-1.0, 1.0) * half;
                wave.move_to(x, top);
                wave.line_to(x, bottom.max(top + 1.0));
            }
            canvas.stroke_path(
                &wave,
                &vg::Paint::color(vg::Color::rgb(96, 165, 250)).with_line_width(col_w.max(1.0)),
            );
        }

        if !self.meters.is_bypassed() {
            let offset = threshold_offset(self.params.threshold.value()) * half;

            let mut band = vg::Path::new();
            band.rect(b.x, mid - offset, b.w, offset * 2.0);
            canvas.fill_path(
                &band,
                &vg::Paint::color(vg::Color::rgba(250, 204, 21, 24)),
            );

            let mut lines = vg::Path::new();
            lines.move_to(b.x, mid - offset);
            lines.line_to(b.x + b.w, mid - offset);
            lines.move_to(b.x, mid + offset);
            lines.line_to(b.x + b.w, mid + offset);
            canvas.stroke_path(
                &lines,
                &vg::Paint::color(vg::Color::rgb(250, 204, 21)).with_line_width(1.0),
            );
        }

        canvas.stroke_path(
            &bg,
            &vg::Paint::color(vg::Color::rgb(51, 65, 85)).with_line_width(1.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_fill_covers_display_range() {
        assert_eq!(meter_fill(-100.0), 0.0);
        assert_eq!(meter_fill(-60.0), 0.0);
        assert_eq!(meter_fill(6.0), 1.0);
        assert!((meter_fill(-27.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn threshold_maps_midline_to_edge() {
        assert_eq!(threshold_offset(-60.0), 0.0);
        assert_eq!(threshold_offset(20.0), 1.0);
        assert!((threshold_offset(-20.0) - 0.5).abs() < 1e-6);
    }
}
