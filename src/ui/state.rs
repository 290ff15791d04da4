//! Editor data model.

use crate::waveform::{WaveformHistory, DEFAULT_VISIBLE_COLUMNS, MAX_VISIBLE_COLUMNS, MIN_VISIBLE_COLUMNS};
use crate::CompressorParams;
use nih_plug_vizia::vizia::prelude::*;
use std::sync::{Arc, Mutex};

const ZOOM_SPAN: f32 = (MAX_VISIBLE_COLUMNS - MIN_VISIBLE_COLUMNS) as f32;

/// Slider position (0..1) to visible waveform columns.
pub fn zoom_to_columns(zoom: f32) -> usize {
    MIN_VISIBLE_COLUMNS + (zoom.clamp(0.0, 1.0) * ZOOM_SPAN).round() as usize
}

pub fn columns_to_zoom(columns: usize) -> f32 {
    let columns = columns.clamp(MIN_VISIBLE_COLUMNS, MAX_VISIBLE_COLUMNS);
    (columns - MIN_VISIBLE_COLUMNS) as f32 / ZOOM_SPAN
}

#[derive(Lens, Clone)]
pub struct EditorData {
    pub params: Arc<CompressorParams>,
    /// Zoom slider position, 0..1
    pub wave_zoom: f32,
    pub waveform: Arc<Mutex<WaveformHistory>>,
}

impl EditorData {
    pub fn new(params: Arc<CompressorParams>, waveform: Arc<Mutex<WaveformHistory>>) -> Self {
        let columns = waveform
            .lock()
            .map(|h| h.visible_columns())
            .unwrap_or(DEFAULT_VISIBLE_COLUMNS);
        Self {
            params,
            wave_zoom: columns_to_zoom(columns),
            waveform,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SetWaveZoom(f32),
}

impl Model for EditorData {
    fn event(&mut self, cx: &mut EventContext, event: &mut Event) {
        event.map(|editor_event, _| match editor_event {
            EditorEvent::SetWaveZoom(zoom) => {
                self.wave_zoom = zoom.clamp(0.0, 1.0);
                if let Ok(mut history) = self.waveform.lock() {
                    history.set_visible_columns(zoom_to_columns(self.wave_zoom));
                }
                cx.needs_redraw();
            }
        });
    }
}
