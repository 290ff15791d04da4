pub mod compressor;
pub mod gain;
pub mod level_meter;
pub mod smoothing;
pub mod utils;

pub use compressor::{Compressor, CompressorSettings};
pub use gain::RampedGain;
pub use level_meter::SmoothedLevel;
pub use smoothing::LinearRamp;
