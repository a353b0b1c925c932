#![allow(dead_code)]
use clapbeat::config::SynthConfig;
use clapbeat::types::{AudioBuffer, ClapEvent, RhythmPattern, TimeSignature};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn seeded(seed: u64) -> StdRng {
  StdRng::seed_from_u64(seed)
}

/// Low sample rate keeps rendering tests quick.
pub fn test_synth_config() -> SynthConfig {
  SynthConfig { sample_rate: 8000, ..SynthConfig::default() }
}

pub fn claps(times: &[f64], prominences: &[f32]) -> Vec<ClapEvent> {
  times.iter().zip(prominences).map(|(&time, &prominence)| ClapEvent { time, prominence }).collect()
}

pub fn pattern(bpm: u32, numerator: u32, denominator: u32, strong: &[u32], suppress: &[u32]) -> RhythmPattern {
  RhythmPattern::new(
    bpm,
    TimeSignature::new(numerator, denominator),
    strong.iter().copied(),
    suppress.iter().copied(),
  )
  .unwrap()
}

/// Short decaying noise-like bursts standing in for hand claps.
pub fn clap_audio(sample_rate: u32, onsets: &[f64], len_s: f64) -> AudioBuffer {
  let mut samples = vec![0f32; (len_s * sample_rate as f64) as usize];
  for &t in onsets {
    let start = (t * sample_rate as f64) as usize;
    for j in 0..400 {
      if let Some(s) = samples.get_mut(start + j) {
        let decay = (-(j as f32) / 80.0).exp();
        *s += decay * if j % 3 == 0 { 1.0 } else { -0.5 };
      }
    }
  }
  AudioBuffer::new(samples, sample_rate)
}

pub fn write_wav(audio: &AudioBuffer, path: &std::path::Path) {
  let spec = hound::WavSpec {
    channels: 1,
    sample_rate: audio.sample_rate,
    bits_per_sample: 16,
    sample_format: hound::SampleFormat::Int,
  };
  let mut writer = hound::WavWriter::create(path, spec).unwrap();
  for s in &audio.samples {
    writer.write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16).unwrap();
  }
  writer.finalize().unwrap();
}
