//! Real-time-safe diagnostics for the compressor.
//!
//! The audio thread must not log. It posts small `PipelineEvent` values into
//! a fixed-size queue instead, and the editor timer forwards them to the
//! `log` backend installed by nih_plug. Events are dropped when the queue is
//! full.

use ringbuf::{Consumer, Producer, RingBuffer};
use std::fmt;

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PipelineEvent {
    Bypassed,
    Activated,
    Reset { sample_rate: f32 },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::Bypassed => write!(f, "pipeline bypassed, meters parked at floor"),
            PipelineEvent::Activated => write!(f, "pipeline active"),
            PipelineEvent::Reset { sample_rate } => {
                write!(f, "pipeline reset at {sample_rate} Hz")
            }
        }
    }
}

pub fn event_queue() -> (EventSender, EventLog) {
    let (producer, consumer) = RingBuffer::<PipelineEvent>::new(EVENT_CAPACITY).split();
    (EventSender { producer }, EventLog { consumer })
}

/// Audio-thread end of the queue.
pub struct EventSender {
    producer: Producer<PipelineEvent>,
}

impl EventSender {
    #[inline]
    pub fn post(&mut self, event: PipelineEvent) {
        let _ = self.producer.push(event);
    }
}

/// Editor end of the queue.
pub struct EventLog {
    consumer: Consumer<PipelineEvent>,
}

impl EventLog {
    pub fn pop(&mut self) -> Option<PipelineEvent> {
        self.consumer.pop()
    }

    /// Forward every pending event to `log::debug!`. Returns how many were written.
    pub fn drain_to_log(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.consumer.pop() {
            log::debug!("{event}");
            count += 1;
        }
        count
    }
}
