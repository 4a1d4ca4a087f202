use std::path::Path;

use super::error::LoadError;
use super::filename;
use super::model::Dataset;
use super::normalize::normalize;
use super::reader::read;
use super::variant::FormatVariant;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a file whose variant and port count are known.
pub fn load_file(path: &Path, variant: FormatVariant, ports: usize) -> Result<Dataset, LoadError> {
    let source = filename::base_name(path)?;
    let lines = read_lines(path)?;

    let records = read(&lines, variant, ports)?;
    let dataset = normalize(&records, variant.encoding(), ports, &source)?;

    log::info!(
        "Loaded {source}: {} rows, {ports} ports, {variant}",
        dataset.len()
    );
    Ok(dataset)
}

/// Load a real/imaginary file, taking the port count from its extension
/// (`BSL1.s2p` → 2 ports).
pub fn load_snp(path: &Path) -> Result<Dataset, LoadError> {
    let meta = filename::parse(path)?;
    load_file(path, FormatVariant::RealImag, meta.ports)
}

/// Either of the above: explicit parameters win, otherwise fall back to the
/// filename convention. A variant without a port count still reads the port
/// count from the extension.
pub fn load(
    path: &Path,
    variant: Option<FormatVariant>,
    ports: Option<usize>,
) -> Result<Dataset, LoadError> {
    match (variant, ports) {
        (None, None) => load_snp(path),
        (variant, Some(ports)) => {
            load_file(path, variant.unwrap_or(FormatVariant::RealImag), ports)
        }
        (Some(variant), None) => load_file(path, variant, filename::parse(path)?.ports),
    }
}

/// Read the whole file and split it into lines; the handle is closed on return.
pub fn read_lines(path: &Path) -> Result<Vec<String>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(str::to_string).collect())
}
