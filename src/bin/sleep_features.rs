/// sleep_features: read a single-channel recording from safetensors, extract
/// the per-epoch sleep-staging features and write the table.
///
/// Input keys:
///   data    [T] or [1, T]   F32/F64  EEG samples
///   sfreq   [1]             F32/F64  sampling rate (Hz)
///
/// Output (safetensors):
///   features  [E, F]  F64  feature table
///   columns   [N]     U8   newline-separated column names
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use sleepstage::{write_features, write_features_csv, Metadata, RawSignal, SleepStaging, StagingConfig};

#[derive(Parser, Debug)]
#[command(name = "sleep_features", about = "Sleep-staging feature extraction from single-channel EEG")]
struct Args {
    /// Input safetensors file with `data` and `sfreq`.
    #[arg(long)]
    input: PathBuf,

    /// Output path.
    #[arg(long)]
    output: PathBuf,

    /// Write CSV instead of safetensors.
    #[arg(long)]
    csv: bool,

    /// Lower edge of the broad band (Hz).
    #[arg(long, default_value_t = 0.5)]
    low: f64,

    /// Upper edge of the broad band (Hz).
    #[arg(long, default_value_t = 40.0)]
    high: f64,

    /// Welch window length (s).
    #[arg(long, default_value_t = 4.0)]
    window_sec: f64,

    /// Subject age in years.
    #[arg(long)]
    age: Option<f64>,

    /// Subject sex: 1 = male, 0 = female.
    #[arg(long)]
    male: Option<u8>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = RawSignal::load(&args.input)?;
    println!("Loaded {:?} samples @ {} Hz", raw.data.shape(), raw.sfreq);

    let metadata = match (args.age, args.male) {
        (None, None) => None,
        (age, male) => Some(Metadata::new(age, male).context("invalid subject metadata")?),
    };

    let mut sls = SleepStaging::new(raw.data.view(), raw.sfreq, metadata)
        .context("input rejected")?;

    let t0 = std::time::Instant::now();
    let cfg = StagingConfig::with_fit_args((args.low, args.high), args.window_sec);
    let table = sls.fit(&cfg).context("feature extraction failed")?;
    println!(
        "Extracted {} epochs × {} features in {:.1} ms",
        table.n_rows(),
        table.n_cols(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    if args.csv {
        write_features_csv(table, &args.output)?;
    } else {
        write_features(table, &args.output)?;
    }
    println!("Written → {}", args.output.display());
    Ok(())
}
