//! Wrapping raw speech PCM into WAV so browsers can play it.

use crate::ai::mime::DataUri;
use crate::{Error, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Gemini TTS output: mono, 24 kHz, signed 16-bit little-endian.
pub const SPEECH_WAV_SPEC: WavSpec = WavSpec {
    channels: 1,
    sample_rate: 24_000,
    bits_per_sample: 16,
    sample_format: SampleFormat::Int,
};

/// Encode little-endian 16-bit PCM as a WAV file.
pub fn pcm_to_wav(pcm: &[u8], spec: WavSpec) -> Result<Vec<u8>> {
    if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(Error::InvalidInput(
            "only 16-bit integer PCM is supported".to_string(),
        ));
    }
    if pcm.len() % 2 != 0 {
        return Err(Error::InvalidInput(format!(
            "PCM buffer has odd length {}",
            pcm.len()
        )));
    }

    let mut buffer = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = WavWriter::new(&mut buffer, spec)?;
        let mut samples = writer.get_i16_writer(pcm.len() as u32 / 2);
        for chunk in pcm.chunks_exact(2) {
            samples.write_sample(i16::from_le_bytes([chunk[0], chunk[1]]));
        }
        samples.flush()?;
        writer.finalize()?;
    }
    Ok(buffer.into_inner())
}

/// PCM straight to a `data:audio/wav;base64,...` URI.
pub fn wav_data_uri(pcm: &[u8]) -> Result<String> {
    let wav = pcm_to_wav(pcm, SPEECH_WAV_SPEC)?;
    Ok(DataUri::encode("audio/wav", &wav))
}
