use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Dataset, SParam};

/// Metric columns written for every pair, in order.
const METRIC_TAGS: [&str; 5] = ["RE", "IM", "MODULUS", "DB", "VSWR"];

/// Write the canonical table as CSV: `freq[MHz]`, then `Sij[RE]`, `Sij[IM]`,
/// `Sij[MODULUS]`, `Sij[DB]`, `Sij[VSWR]` per pair. Undefined values are
/// left empty.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let pairs = dataset.pairs();
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["freq[MHz]".to_string()];
    for pair in &pairs {
        header.extend(METRIC_TAGS.iter().map(|tag| format!("{pair}[{tag}]")));
    }
    out.write_record(&header).context("writing CSV header")?;

    for (i, row) in dataset.rows().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.frequency_mhz.to_string());
        for pair in &pairs {
            let param = row
                .get(*pair)
                .with_context(|| format!("row {i}: no value for {pair}"))?;
            record.extend(cells(param));
        }
        out.write_record(&record)
            .with_context(|| format!("writing CSV row {i}"))?;
    }

    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Write the canonical table to `path`.
pub fn write_csv_file(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, file)?;
    log::info!("Wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

fn cells(param: &SParam) -> [String; 5] {
    let optional = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    [
        param.re.to_string(),
        param.im.to_string(),
        param.modulus.to_string(),
        optional(param.db),
        optional(param.vswr),
    ]
}
