//! Waveform display feed.
//!
//! The audio thread condenses the first channel into min/max columns of
//! `SAMPLES_PER_COLUMN` samples and pushes them through a lock-free SPSC
//! queue. The editor drains the queue into a bounded history and draws the
//! most recent `visible_columns` of it.

use ringbuf::{Consumer, Producer, RingBuffer};
use std::collections::VecDeque;

pub const SAMPLES_PER_COLUMN: usize = 256;
pub const MIN_VISIBLE_COLUMNS: usize = 128;
pub const MAX_VISIBLE_COLUMNS: usize = 1024;
pub const DEFAULT_VISIBLE_COLUMNS: usize = 576;

/// Peak range of one display column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveColumn {
    pub min: f32,
    pub max: f32,
}

impl WaveColumn {
    const EMPTY: WaveColumn = WaveColumn {
        min: f32::MAX,
        max: f32::MIN,
    };

    #[inline]
    fn include(&mut self, sample: f32) {
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
    }
}

/// Create a connected tap (audio side) and history (editor side).
pub fn waveform_feed() -> (WaveformTap, WaveformHistory) {
    let (producer, consumer) = RingBuffer::<WaveColumn>::new(MAX_VISIBLE_COLUMNS).split();
    (
        WaveformTap {
            producer,
            pending: WaveColumn::EMPTY,
            pending_len: 0,
        },
        WaveformHistory {
            consumer,
            columns: VecDeque::with_capacity(MAX_VISIBLE_COLUMNS),
            visible_columns: DEFAULT_VISIBLE_COLUMNS,
        },
    )
}

pub struct WaveformTap {
    producer: Producer<WaveColumn>,
    pending: WaveColumn,
    pending_len: usize,
}

impl WaveformTap {
    /// Feed a block. Never blocks or allocates; columns are dropped when the
    /// editor is not draining.
    pub fn push_block(&mut self, channels: &[&mut [f32]]) {
        let Some(channel) = channels.first() else {
            return;
        };

        for &sample in channel.iter() {
            self.pending.include(sample);
            self.pending_len += 1;
            if self.pending_len == SAMPLES_PER_COLUMN {
                let _ = self.producer.push(self.pending);
                self.pending = WaveColumn::EMPTY;
                self.pending_len = 0;
            }
        }
    }

    /// Forget a partially filled column.
    pub fn clear(&mut self) {
        self.pending = WaveColumn::EMPTY;
        self.pending_len = 0;
    }
}

pub struct WaveformHistory {
    consumer: Consumer<WaveColumn>,
    columns: VecDeque<WaveColumn>,
    visible_columns: usize,
}

impl WaveformHistory {
    /// Move everything the tap produced into the history. Returns the number
    /// of new columns.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Some(column) = self.consumer.pop() {
            if self.columns.len() == MAX_VISIBLE_COLUMNS {
                self.columns.pop_front();
            }
            self.columns.push_back(column);
            count += 1;
        }
        count
    }

    pub fn set_visible_columns(&mut self, columns: usize) {
        self.visible_columns = columns.clamp(MIN_VISIBLE_COLUMNS, MAX_VISIBLE_COLUMNS);
    }

    pub fn visible_columns(&self) -> usize {
        self.visible_columns
    }

    /// The most recent columns, oldest first. Shorter than `visible_columns`
    /// until enough audio has arrived.
    pub fn visible(&self) -> impl Iterator<Item = &WaveColumn> {
        let skip = self.columns.len().saturating_sub(self.visible_columns);
        self.columns.iter().skip(skip)
    }
}
