//! Compressor editor
//!
//! - `state`: editor model and events
//! - `meters`: level meter and waveform widgets
//! - `layout`: window structure and the refresh timer

pub mod layout;
pub mod meters;
pub mod state;

pub use layout::build_ui;
