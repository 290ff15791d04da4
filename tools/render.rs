//! Offline renderer: runs a WAV file through the compressor pipeline.
//!
//! Usage: render <in.wav> <out.wav> [attack=ms] [release=ms] [threshold=dB]
//!        [ratio=N] [input=dB] [output=dB] [bypass=true|false]

use anyhow::{bail, Context, Result};
use basic_compressor::debug::event_queue;
use basic_compressor::dsp::utils::{channel_rms, lin_to_db};
use basic_compressor::meters::{MeterId, Meters};
use basic_compressor::pipeline::{BlockPipeline, ParameterSet};
use basic_compressor::waveform::waveform_feed;
use basic_compressor::Ratio;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::PathBuf;
use std::sync::Arc;

const BLOCK_FRAMES: usize = 512;

fn parse_ranged(key: &str, value: &str, min: f32, max: f32) -> Result<f32> {
    let v: f32 = value
        .parse()
        .with_context(|| format!("'{key}' expects a number, got '{value}'"))?;
    if !(min..=max).contains(&v) {
        bail!("'{key}' must be within {min}..{max}, got {v}");
    }
    Ok(v)
}

fn parse_overrides<'a>(args: impl IntoIterator<Item = &'a str>) -> Result<ParameterSet> {
    let mut params = ParameterSet::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("expected key=value, got '{arg}'");
        };
        match key {
            "attack" => params.attack_ms = parse_ranged(key, value, 5.0, 500.0)?,
            "release" => params.release_ms = parse_ranged(key, value, 5.0, 500.0)?,
            "threshold" => params.threshold_db = parse_ranged(key, value, -60.0, 20.0)?,
            "input" => params.input_gain_db = parse_ranged(key, value, -24.0, 24.0)?,
            "output" => params.output_gain_db = parse_ranged(key, value, -24.0, 24.0)?,
            "ratio" => {
                let v = parse_ranged(key, value, 1.0, 100.0)?;
                let ratio = Ratio::from_value(v).with_context(|| {
                    let allowed: Vec<String> =
                        Ratio::ALL.iter().map(|r| r.value().to_string()).collect();
                    format!("ratio {v} is not one of {}", allowed.join(", "))
                })?;
                params.ratio = ratio.value();
            }
            "bypass" => {
                params.bypass = value
                    .parse()
                    .with_context(|| format!("'bypass' expects true or false, got '{value}'"))?;
            }
            _ => bail!("unknown setting '{key}'"),
        }
    }
    Ok(params)
}

/// Read a mono or stereo WAV into one buffer per channel.
fn read_channels(path: &PathBuf) -> Result<(WavSpec, Vec<Vec<f32>>)> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open input WAV '{}'", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if !(1..=2).contains(&channels) {
        bail!("only mono and stereo files are supported, got {channels} channels");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to decode float samples")?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .context("failed to decode integer samples")?
        }
    };

    let mut out = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (ch, &sample) in frame.iter().enumerate() {
            out[ch].push(sample);
        }
    }
    Ok((spec, out))
}

fn write_channels(path: &PathBuf, sample_rate: u32, channels: &[Vec<f32>]) -> Result<()> {
    let spec = WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create output WAV '{}'", path.display()))?;
    let frames = channels.first().map_or(0, Vec::len);
    for i in 0..frames {
        for channel in channels {
            writer.write_sample(channel[i])?;
        }
    }
    writer.finalize().context("failed to finalize output WAV")?;
    Ok(())
}

fn overall_rms_db(channels: &[Vec<f32>]) -> f32 {
    let all: Vec<f32> = channels.iter().flatten().copied().collect();
    lin_to_db(channel_rms(&all))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: render <in.wav> <out.wav> [attack=ms] [release=ms] [threshold=dB] [ratio=N] [input=dB] [output=dB] [bypass=true|false]");
    }
    let input = PathBuf::from(&args[0]);
    let output = PathBuf::from(&args[1]);
    let params = parse_overrides(args[2..].iter().map(String::as_str))?;

    let (spec, mut channels) = read_channels(&input)?;
    let input_rms = overall_rms_db(&channels);

    let meters = Arc::new(Meters::new());
    let (tap, _history) = waveform_feed();
    let (events, mut event_log) = event_queue();
    let mut pipeline = BlockPipeline::new(meters.clone(), tap, events);
    pipeline.reset(spec.sample_rate as f32);

    let frames = channels.first().map_or(0, Vec::len);
    let mut start = 0;
    while start < frames {
        let end = (start + BLOCK_FRAMES).min(frames);
        match channels.as_mut_slice() {
            [mono] => pipeline.process(&mut [&mut mono[start..end]], &params),
            [left, right] => pipeline.process(
                &mut [&mut left[start..end], &mut right[start..end]],
                &params,
            ),
            other => bail!("unsupported channel count {}", other.len()),
        }
        start = end;
    }
    while let Some(event) = event_log.pop() {
        println!("  event: {event}");
    }

    write_channels(&output, spec.sample_rate, &channels)?;

    println!("Rendered '{}' -> '{}'", input.display(), output.display());
    println!("  frames          : {frames}");
    println!("  settings        : {params:?}");
    println!("  input RMS       : {input_rms:.2} dB");
    println!("  output RMS      : {:.2} dB", overall_rms_db(&channels));
    for id in MeterId::ALL {
        println!("  meter {:<9} : {:.2} dB", format!("{id:?}"), meters.level(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overrides() {
        let params = parse_overrides(std::iter::empty()).unwrap();
        assert_eq!(params, ParameterSet::default());
    }

    #[test]
    fn overrides_are_applied() {
        let params =
            parse_overrides(["attack=10", "ratio=4", "threshold=-18", "bypass=true"]).unwrap();
        assert_eq!(params.attack_ms, 10.0);
        assert_eq!(params.ratio, 4.0);
        assert_eq!(params.threshold_db, -18.0);
        assert!(params.bypass);
    }

    #[test]
    fn out_of_range_and_unknown_are_rejected() {
        assert!(parse_overrides(["attack=1"]).is_err());
        assert!(parse_overrides(["input=30"]).is_err());
        assert!(parse_overrides(["ratio=12"]).is_err());
        assert!(parse_overrides(["knee=3"]).is_err());
        assert!(parse_overrides(["threshold"]).is_err());
    }
}
