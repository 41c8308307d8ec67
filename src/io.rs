//! Safetensors and CSV I/O.
//!
//! Reader: a single-channel recording stored as a `data` tensor (F32 or F64,
//! shape `[T]`, `[1, T]` or `[T, 1]`) plus an `sfreq` scalar.
//!
//! Writers: the feature table as safetensors (`features` F64 tensor +
//! newline-separated `columns` U8 tensor) or as CSV with an `epoch` index.
use anyhow::{bail, Context, Result};
use ndarray::{ArrayD, IxDyn};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::table::FeatureTable;

// ── Low-level safetensors parser ─────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let n = u64::from_le_bytes(bytes[..8].try_into()?) as usize;
    if bytes.len() < 8 + n {
        bail!("safetensors header truncated");
    }
    let header: HashMap<String, Value> =
        serde_json::from_slice(&bytes[8..8 + n]).context("failed to parse safetensors header")?;
    Ok((header, 8 + n))
}

fn tensor_bytes<'a>(bytes: &'a [u8], data_start: usize, entry: &Value) -> Result<&'a [u8]> {
    let offsets = entry["data_offsets"].as_array().context("missing data_offsets")?;
    let s = offsets.first().and_then(Value::as_u64).context("bad data_offsets")? as usize;
    let e = offsets.get(1).and_then(Value::as_u64).context("bad data_offsets")? as usize;
    bytes
        .get(data_start + s..data_start + e)
        .context("tensor data out of bounds")
}

fn read_f64_tensor(bytes: &[u8], data_start: usize, entry: &Value) -> Result<Vec<f64>> {
    let raw = tensor_bytes(bytes, data_start, entry)?;
    match entry["dtype"].as_str() {
        Some("F64") => Ok(raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect()),
        Some("F32") => Ok(raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect()),
        other => bail!("unsupported dtype {other:?}, expected F32 or F64"),
    }
}

fn shape_of(entry: &Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .context("missing shape")?
        .iter()
        .map(|v| v.as_u64().map(|x| x as usize).context("bad shape entry"))
        .collect()
}

// ── Reader ───────────────────────────────────────────────────────────────────

/// Single-channel recording loaded from safetensors.
#[derive(Debug, Clone)]
pub struct RawSignal {
    /// Samples with the stored shape; validation squeezes it later.
    pub data: ArrayD<f64>,
    /// Sampling rate (Hz).
    pub sfreq: f64,
}

impl RawSignal {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let (header, data_start) = parse_header(&bytes)?;

        let data_entry = header.get("data").context("missing 'data' key")?;
        let shape = shape_of(data_entry)?;
        let values = read_f64_tensor(&bytes, data_start, data_entry)?;
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .context("'data' length does not match its shape")?;

        let sfreq_entry = header.get("sfreq").context("missing 'sfreq' key")?;
        let sfreq = *read_f64_tensor(&bytes, data_start, sfreq_entry)?
            .first()
            .context("'sfreq' is empty")?;

        Ok(RawSignal { data, sfreq })
    }
}

// ── Generic safetensors builder ──────────────────────────────────────────────

/// Minimal safetensors writer for F64 and U8 tensors.
///
/// ```rust,no_run
/// use sleepstage::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f64("data", &[0.0f64; 30_000], &[30_000]);
/// w.add_f64("sfreq", &[100.0], &[1]);
/// w.write(Path::new("/tmp/raw.safetensors")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    pub fn add_u8(&mut self, name: &str, data: &[u8]) {
        self.entries.push((name.to_string(), data.to_vec(), "U8", vec![data.len()]));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let mut hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        hdr_bytes.extend(std::iter::repeat(b' ').take(pad));

        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        f.write_all(&(hdr_bytes.len() as u64).to_le_bytes())?;
        f.write_all(&hdr_bytes)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

// ── Feature table writers ────────────────────────────────────────────────────

/// Write `table` to safetensors: `features` [n_epochs, n_cols] F64 and
/// `columns` (column names joined by `\n`) U8.
pub fn write_features(table: &FeatureTable, path: &Path) -> Result<()> {
    let mut w = StWriter::new();
    let values: Vec<f64> = table.values().iter().copied().collect();
    w.add_f64("features", &values, &[table.n_rows(), table.n_cols()]);
    w.add_u8("columns", table.columns().join("\n").as_bytes());
    w.write(path)
}

/// Write `table` as CSV with a leading `epoch` column.  `NaN` is written as
/// an empty cell.
pub fn write_features_csv(table: &FeatureTable, path: &Path) -> Result<()> {
    let f = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut out = std::io::BufWriter::new(f);

    writeln!(out, "epoch,{}", table.columns().join(","))?;
    for row in table.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|(_, v)| if v.is_nan() { String::new() } else { v.to_string() })
            .collect();
        writeln!(out, "{},{}", row.epoch, cells.join(","))?;
    }
    out.flush()?;
    Ok(())
}
