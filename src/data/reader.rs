use std::collections::{BTreeMap, HashMap};

use super::error::FormatError;
use super::model::{PortPair, RawRecord, RawValue, MAX_PORTS};
use super::variant::{FormatVariant, FrequencyUnit, Layout};

/// Characters that may prefix a header line.
const HEADER_MARKERS: &[char] = &['!', '#'];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse the lines of one file into raw records.
///
/// The variant decides where the header sits, how many physical lines the
/// header and each record occupy (both scale with `ports` for the dB/angle
/// variants), what the pair columns are called and which units apply.
///
/// Records come back in file order. Nothing is returned on failure.
pub fn read<S: AsRef<str>>(
    lines: &[S],
    variant: FormatVariant,
    ports: usize,
) -> Result<Vec<RawRecord>, FormatError> {
    if ports == 0 || ports > MAX_PORTS {
        return Err(FormatError::UnsupportedPortCount(ports));
    }
    let layout = variant.layout();

    let header = Header::locate(lines, &layout, ports)?;
    let data_start = check_separator(lines, &layout, header.end)?;

    // Blank lines inside the data block are separator noise; drop them before
    // grouping or every later record is misaligned. Keep the 1-based line
    // number of each survivor for error messages.
    let data: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .skip(data_start)
        .map(|(i, l)| (i + 1, l.as_ref()))
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();

    let span = layout.record_lines(ports);
    if data.len() % span != 0 {
        return Err(FormatError::RaggedRecords {
            lines: data.len(),
            span,
        });
    }

    log::debug!(
        "{variant}: {ports} ports, header at line {}, {} data lines in {}-line records",
        layout.header_offset + 1,
        data.len(),
        span
    );

    data.chunks(span)
        .enumerate()
        .map(|(record, chunk)| header.parse_record(record, chunk, &layout))
        .collect()
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Column positions resolved from the header.
#[derive(Debug)]
struct Header {
    /// Index of the first line after the header.
    end: usize,
    columns: usize,
    frequency_unit: FrequencyUnit,
    /// Token positions of the two fields of every pair.
    pairs: Vec<(PortPair, [usize; 2])>,
}

impl Header {
    fn locate<S: AsRef<str>>(
        lines: &[S],
        layout: &Layout,
        ports: usize,
    ) -> Result<Self, FormatError> {
        let start = layout.header_offset;
        let end = start + layout.header_lines(ports);
        if lines.len() < end {
            return Err(FormatError::HeaderNotFound {
                line: start + 1,
                reason: format!(
                    "file has {} lines, header needs lines {}..={}",
                    lines.len(),
                    start + 1,
                    end
                ),
            });
        }

        let tokens: Vec<&str> = lines[start..end]
            .iter()
            .flat_map(|l| l.as_ref().trim().trim_start_matches(HEADER_MARKERS).split_whitespace())
            .collect();
        let names = join_qualified(&tokens, layout);

        let frequency_column = names.first().map(String::as_str).unwrap_or("");
        if !frequency_column.to_ascii_lowercase().starts_with("freq") {
            return Err(FormatError::HeaderNotFound {
                line: start + 1,
                reason: format!("first column '{frequency_column}' is not a frequency column"),
            });
        }
        let frequency_unit = FrequencyUnit::from_column_name(frequency_column)
            .unwrap_or(layout.default_frequency_unit);

        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut pairs = Vec::with_capacity(ports * ports);
        for pair in PortPair::enumerate(ports) {
            let [a, b] = layout.field_names(&pair.to_string());
            let lookup = |column: String| {
                index
                    .get(column.as_str())
                    .copied()
                    .ok_or(FormatError::MissingColumn { column })
            };
            pairs.push((pair, [lookup(a)?, lookup(b)?]));
        }

        Ok(Header {
            end,
            columns: names.len(),
            frequency_unit,
            pairs,
        })
    }

    fn parse_record(
        &self,
        record: usize,
        chunk: &[(usize, &str)],
        layout: &Layout,
    ) -> Result<RawRecord, FormatError> {
        let first_line = chunk.first().map(|(n, _)| *n).unwrap_or(0);

        // Tokens of all physical lines, concatenated in file order.
        let tokens: Vec<(usize, &str)> = chunk
            .iter()
            .flat_map(|&(n, l)| l.split_whitespace().map(move |t| (n, t)))
            .collect();

        if tokens.len() != self.columns {
            return Err(FormatError::FieldCount {
                record,
                line: first_line,
                expected: self.columns,
                found: tokens.len(),
            });
        }

        let values: Vec<f64> = tokens
            .iter()
            .map(|&(line, token)| {
                token.parse::<f64>().map_err(|_| FormatError::InvalidNumber {
                    line,
                    token: token.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;

        let pairs: BTreeMap<PortPair, RawValue> = self
            .pairs
            .iter()
            .map(|&(pair, [a, b])| {
                let value = match layout.angle_unit {
                    None => RawValue::RealImag {
                        re: values[a],
                        im: values[b],
                    },
                    Some(unit) => RawValue::DbAngle {
                        db: values[a],
                        angle: values[b],
                        unit,
                    },
                };
                (pair, value)
            })
            .collect();

        Ok(RawRecord {
            frequency: values[0],
            unit: self.frequency_unit,
            values: pairs,
        })
    }
}

/// Rejoin column names that the file writes as two tokens (`DB S11`).
fn join_qualified(tokens: &[&str], layout: &Layout) -> Vec<String> {
    let qualifiers: Vec<&str> = layout.qualifiers().collect();
    let mut names = Vec::with_capacity(tokens.len());
    let mut iter = tokens.iter();
    while let Some(&token) = iter.next() {
        if qualifiers.contains(&token) {
            if let Some(&next) = iter.next() {
                names.push(format!("{token} {next}"));
                continue;
            }
        }
        names.push(token.to_string());
    }
    names
}

/// Skip the blank separator lines some variants put after the header.
fn check_separator<S: AsRef<str>>(
    lines: &[S],
    layout: &Layout,
    header_end: usize,
) -> Result<usize, FormatError> {
    for i in header_end..header_end + layout.separator_lines {
        match lines.get(i) {
            Some(l) if l.as_ref().trim().is_empty() => {}
            // A header with no data after it is an empty file, not a bad one.
            None => {}
            Some(_) => return Err(FormatError::MissingSeparator { line: i + 1 }),
        }
    }
    Ok(header_end + layout.separator_lines)
}
