use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clapbeat::render::engrave;
use clapbeat::settings::parse_batch;
use clapbeat::{files, reader, CancelToken, Config, RenderRequest, RhythmPattern, Scale, Settings};

#[derive(Parser, Debug)]
#[command(name = "clapbeat")]
#[command(about = "Turn a clapped rhythm into a varied metronome track")]
#[command(version)]
struct Args {
  /// JSON file overriding analysis, inference, variation and synthesis settings
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct Variation {
  /// 0 keeps the clapped pattern, 1 varies it as much as possible
  #[arg(short, long, default_value_t = 0.5)]
  temperature: f32,

  /// Seed for reproducible renders
  #[arg(short, long)]
  seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Infer rhythm settings from a recording of claps
  Infer {
    input: PathBuf,

    /// Print JSON instead of the settings text format
    #[arg(long)]
    json: bool,

    /// Scale written into the settings
    #[arg(long, default_value = "None")]
    scale: Scale,

    /// Duration in minutes written into the settings
    #[arg(long, default_value_t = 1.0)]
    minutes: f32,
  },
  /// Render a click track from a settings file
  Render {
    settings: PathBuf,
    output: PathBuf,

    #[command(flatten)]
    variation: Variation,
  },
  /// Render one click track per record of a batch file into a directory
  Batch {
    records: PathBuf,
    out_dir: PathBuf,

    #[command(flatten)]
    variation: Variation,
  },
  /// Infer from claps and render in one go
  Clap {
    input: PathBuf,
    output: PathBuf,

    #[arg(long, default_value = "None")]
    scale: Scale,

    #[arg(long, default_value_t = 1.0)]
    minutes: f32,

    #[command(flatten)]
    variation: Variation,
  },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
  let Some(path) = path else {
    return Ok(Config::default());
  };
  let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
  serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn infer(path: &Path, conf: &Config) -> Result<RhythmPattern> {
  let audio = reader::samples(path).with_context(|| format!("Failed to read {}", path.display()))?;
  info!(samples = audio.samples.len(), sample_rate = audio.sample_rate, "claps loaded");
  clapbeat::infer_from_audio(&audio, conf).with_context(|| format!("No rhythm found in {}", path.display()))
}

fn render(settings: &Settings, variation: &Variation, output: &Path, conf: &Config) -> Result<()> {
  let mut rng = match variation.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };
  let request = RenderRequest::from_settings(settings, variation.temperature);
  let audio = clapbeat::render(&settings.pattern, &request, conf, &mut rng, &CancelToken::new())?;

  files::with_dir(output).with_context(|| format!("Failed to create directory for {}", output.display()))?;
  engrave::samples(&audio, output).with_context(|| format!("Failed to write {}", output.display()))?;
  info!("Wrote {} ({:.1} s)", output.display(), audio.duration());
  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let args = Args::parse();
  let conf = load_config(args.config.as_deref())?;

  match args.command {
    Command::Infer { input, json, scale, minutes } => {
      let settings = Settings { pattern: infer(&input, &conf)?, scale, duration_minutes: minutes };
      if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
      } else {
        println!("{}", settings);
      }
    }
    Command::Render { settings, output, variation } => {
      let text = fs::read_to_string(&settings).with_context(|| format!("Failed to read {}", settings.display()))?;
      let parsed: Settings = text.parse().with_context(|| format!("Invalid settings in {}", settings.display()))?;
      render(&parsed, &variation, &output, &conf)?;
    }
    Command::Batch { records, out_dir, variation } => {
      let text = fs::read_to_string(&records).with_context(|| format!("Failed to read {}", records.display()))?;
      let batch = parse_batch(&text).with_context(|| format!("Invalid batch file {}", records.display()))?;
      for (i, settings) in batch.iter().enumerate() {
        let ts = settings.pattern.time_signature();
        let output = out_dir.join(format!(
          "{:02}_{}bpm_{}-{}.wav",
          i + 1,
          settings.pattern.bpm(),
          ts.numerator,
          ts.denominator
        ));
        info!("Rendering {}", settings.to_record());
        // record i renders with seed + i
        let seeded = Variation { seed: variation.seed.map(|s| s.wrapping_add(i as u64)), ..variation };
        render(settings, &seeded, &output, &conf)?;
      }
    }
    Command::Clap { input, output, scale, minutes, variation } => {
      let settings = Settings { pattern: infer(&input, &conf)?, scale, duration_minutes: minutes };
      info!("Inferred {}", settings.to_string().replace('\n', " | "));
      render(&settings, &variation, &output, &conf)?;
    }
  }
  Ok(())
}
