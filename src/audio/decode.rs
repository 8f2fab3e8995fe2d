use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::audio::resample::{WHISPER_SAMPLE_RATE, downmix_to_mono, resample};
use crate::error::{Error, Result};

/// Audio decoded from an uploaded byte buffer, ready for the speech model
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Samples at 16kHz mono, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Duration in seconds
    pub duration_secs: f32,
}

/// Decode an in-memory audio buffer into 16kHz mono samples
///
/// The container is probed from the bytes themselves; `file_name` only
/// supplies an extension hint for formats with weak magic (mp3, aac).
pub fn decode_bytes(bytes: &[u8], file_name: Option<&str>) -> Result<DecodedAudio> {
    let (interleaved, sample_rate, channels) = decode_interleaved(bytes, file_name)?;

    let mono = downmix_to_mono(&interleaved, channels);
    let samples = resample(&mono, sample_rate, WHISPER_SAMPLE_RATE);
    if samples.is_empty() {
        return Err(Error::AudioDecode("No audio samples in upload".to_string()));
    }
    let duration_secs = samples.len() as f32 / WHISPER_SAMPLE_RATE as f32;

    debug!(
        "Decoded {} bytes: {} channel(s) at {} Hz, {:.1}s after resample",
        bytes.len(),
        channels,
        sample_rate,
        duration_secs
    );

    Ok(DecodedAudio {
        samples,
        duration_secs,
    })
}

/// Decode the first audio track into interleaved f32 samples
fn decode_interleaved(bytes: &[u8], file_name: Option<&str>) -> Result<(Vec<f32>, u32, usize)> {
    if bytes.is_empty() {
        return Err(Error::AudioDecode("Empty upload".to_string()));
    }

    let cursor = Cursor::new(bytes.to_vec());
    let stream = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
    {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioDecode(format!("Unsupported or corrupt container: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::AudioDecode("No decodable audio track".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode(format!("Unsupported codec: {}", e)))?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(Error::AudioDecode(format!("Packet read failed: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        if let Some(spec) = decode_packet(decoder.as_mut(), &packet, &mut samples, &mut sample_buf)?
        {
            sample_rate = spec.rate;
            channels = spec.channels.count();
        }
    }

    if samples.is_empty() || sample_rate == 0 || channels == 0 {
        return Err(Error::AudioDecode("No audio samples in upload".to_string()));
    }

    Ok((samples, sample_rate, channels))
}

/// Append one packet's samples, returning its signal spec
///
/// A malformed packet mid-stream is recoverable; it is logged and skipped
/// (`None`) and the decoder resyncs at the next packet.
fn decode_packet(
    decoder: &mut dyn Decoder,
    packet: &Packet,
    samples: &mut Vec<f32>,
    sample_buf: &mut Option<SampleBuffer<f32>>,
) -> Result<Option<SignalSpec>> {
    match decoder.decode(packet) {
        Ok(decoded) => {
            let spec = *decoded.spec();
            if sample_buf.is_none() {
                *sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
            }
            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Ok(Some(spec))
        }
        Err(SymphoniaError::DecodeError(e)) => {
            warn!("Skipping malformed packet: {}", e);
            Ok(None)
        }
        Err(e) => Err(Error::AudioDecode(format!("Decode failed: {}", e))),
    }
}
