use nih_plug::util;

/// Level reported for silence. Also the value meters are parked at on reset and bypass.
pub const METER_FLOOR_DB: f32 = util::MINUS_INFINITY_DB;

// Amplitudes at or below this map to the floor exactly (-100 dB).
const FLOOR_GAIN: f32 = 1e-5;

/// Linear amplitude to dB, never below `METER_FLOOR_DB` and never NaN.
#[inline]
pub fn lin_to_db(gain: f32) -> f32 {
    if gain > FLOOR_GAIN {
        util::gain_to_db(gain).max(METER_FLOOR_DB)
    } else {
        METER_FLOOR_DB
    }
}

#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    util::db_to_gain(db)
}

/// One-pole coefficient for a time constant given in milliseconds.
#[inline]
pub fn time_constant_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = (time_ms * 0.001 * sample_rate).max(1.0);
    (-1.0 / samples).exp()
}

/// Root-mean-square of one channel. Empty input yields 0.
pub fn channel_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}
