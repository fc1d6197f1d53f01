//! PCM decode hand-off: takes a file path, returns mono `f64` samples plus
//! the stream's sample rate, original channel count, and duration.
//!
//! Probes the container with `symphonia`, decodes packet by packet, and
//! averages each frame's channels down to mono rather than panicking on
//! anything that goes wrong.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::ShazamError;

pub struct DecodedAudio {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
    pub channels: u8,
    pub duration_seconds: f64,
}

pub fn decode_file(path: &Path) -> Result<DecodedAudio, ShazamError> {
    let file = File::open(path)
        .map_err(|e| ShazamError::DecodeFailure(format!("{}: {e}", path.display())))?;

    let source: Box<dyn MediaSource> = Box::new(file);
    let stream = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ShazamError::DecodeFailure(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .first()
        .ok_or_else(|| ShazamError::DecodeFailure("no audio track found".into()))?;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ShazamError::DecodeFailure("unknown sample rate".into()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ShazamError::DecodeFailure(e.to_string()))?;

    let mut samples = Vec::new();
    let mut channels: u8 = 1;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(ShazamError::DecodeFailure(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(ShazamError::DecodeFailure(e.to_string())),
        };

        let spec = *decoded.spec();
        channels = spec.channels.count() as u8;

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        let num_channels = spec.channels.count().max(1);
        for frame in buf.samples().chunks_exact(num_channels) {
            let mono: f32 = frame.iter().sum::<f32>() / num_channels as f32;
            samples.push(mono as f64);
        }
    }

    if samples.is_empty() {
        return Err(ShazamError::DecodeFailure(
            "decoder produced zero samples".into(),
        ));
    }

    let duration_seconds = samples.len() as f64 / sample_rate as f64;

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
        duration_seconds,
    })
}
