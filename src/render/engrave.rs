use std::path::Path;

use crate::types::AudioBuffer;

/// Write mono audio as a 32-bit float WAV file.
pub fn samples(audio: &AudioBuffer, filename: impl AsRef<Path>) -> Result<(), hound::Error> {
  let spec = hound::WavSpec {
    channels: 1,
    sample_rate: audio.sample_rate,
    bits_per_sample: 32,
    sample_format: hound::SampleFormat::Float,
  };
  let mut writer = hound::WavWriter::create(filename, spec)?;
  for &sample in &audio.samples {
    writer.write_sample(sample)?;
  }
  writer.finalize()
}
