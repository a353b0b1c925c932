use std::path::Path;

use crate::types::AudioBuffer;

/// Read a WAV file of any channel count into a mono, peak-normalized buffer.
///
/// Integer formats are scaled into `[-1, 1]` by their bit depth before downmixing.
pub fn samples(pathname: impl AsRef<Path>) -> Result<AudioBuffer, hound::Error> {
  let mut reader = hound::WavReader::open(pathname)?;
  let spec = reader.spec();

  let interleaved: Vec<f32> = match spec.sample_format {
    hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
    hound::SampleFormat::Int => {
      let scale = 2f32.powi(spec.bits_per_sample as i32 - 1);
      reader
        .samples::<i32>()
        .map(|s| s.map(|v| v as f32 / scale))
        .collect::<Result<_, _>>()?
    }
  };

  Ok(AudioBuffer::from_interleaved(&interleaved, spec.channels as usize, spec.sample_rate))
}
