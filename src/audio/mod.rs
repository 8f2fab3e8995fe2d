//! Audio decoding and preparation for the speech model.
//!
//! Uploads are decoded straight from their in-memory bytes and brought to
//! the 16kHz mono format whisper expects.

mod decode;
mod resample;

pub use decode::{DecodedAudio, decode_bytes};
pub use resample::{WHISPER_SAMPLE_RATE, downmix_to_mono, resample};
