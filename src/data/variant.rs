use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FormatError;

// ---------------------------------------------------------------------------
// Encoding – how each port pair is stored on disk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// `re` / `im` pairs.
    RealImag,
    /// Magnitude in dB plus an angle.
    DbAngle,
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    GHz,
}

impl FrequencyUnit {
    /// Multiplier taking a value in this unit to megahertz.
    pub fn to_mhz_factor(self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1e-6,
            FrequencyUnit::KHz => 1e-3,
            FrequencyUnit::MHz => 1.0,
            FrequencyUnit::GHz => 1e3,
        }
    }

    pub fn to_mhz(self, value: f64) -> f64 {
        match self {
            // Divide rather than multiply by 1e-6 so 1e6 Hz is exactly 1 MHz.
            FrequencyUnit::Hz => value / 1e6,
            FrequencyUnit::KHz => value / 1e3,
            other => value * other.to_mhz_factor(),
        }
    }

    /// Read a bracketed unit out of a column name such as `freq[Hz]`.
    pub fn from_column_name(name: &str) -> Option<Self> {
        let open = name.find('[')?;
        let close = name[open..].find(']')? + open;
        match name[open + 1..close].to_ascii_lowercase().as_str() {
            "hz" => Some(FrequencyUnit::Hz),
            "khz" => Some(FrequencyUnit::KHz),
            "mhz" => Some(FrequencyUnit::MHz),
            "ghz" => Some(FrequencyUnit::GHz),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Radians,
    Degrees,
}

impl AngleUnit {
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Radians => angle,
            AngleUnit::Degrees => angle.to_radians(),
        }
    }
}

// ---------------------------------------------------------------------------
// Layout – per-variant offsets, spans and field names
// ---------------------------------------------------------------------------

/// Whether a header or record occupies one physical line or one per port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSpan {
    Single,
    PerPort,
}

impl LineSpan {
    pub fn lines(self, ports: usize) -> usize {
        match self {
            LineSpan::Single => 1,
            LineSpan::PerPort => ports,
        }
    }
}

/// Everything the reader needs to know about one on-disk variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub encoding: Encoding,
    /// Zero-based index of the first header line.
    pub header_offset: usize,
    pub header_span: LineSpan,
    /// Blank lines expected between the header and the data block.
    pub separator_lines: usize,
    pub record_span: LineSpan,
    /// Column-name prefixes for the two components of each pair, e.g. `re:` / `im:`.
    pub field_prefixes: [&'static str; 2],
    /// Used when the frequency column carries no `[unit]`.
    pub default_frequency_unit: FrequencyUnit,
    /// `None` for real/imaginary encodings.
    pub angle_unit: Option<AngleUnit>,
}

impl Layout {
    pub fn header_lines(&self, ports: usize) -> usize {
        self.header_span.lines(ports)
    }

    pub fn record_lines(&self, ports: usize) -> usize {
        self.record_span.lines(ports)
    }

    /// Header column names for one pair label, e.g. `["re:S11", "im:S11"]`.
    pub fn field_names(&self, label: &str) -> [String; 2] {
        self.field_prefixes.map(|prefix| format!("{prefix}{label}"))
    }

    /// Prefixes written as a separate header token (`DB S11`), without the space.
    pub fn qualifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.field_prefixes
            .iter()
            .filter(|p| p.ends_with(' '))
            .map(|p| p.trim_end())
    }
}

// ---------------------------------------------------------------------------
// FormatVariant – the file layouts observed in the wild
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatVariant {
    /// Single header line, one line per record, `re:`/`im:` columns.
    RealImag,
    /// Like [`RealImag`](Self::RealImag) but frequency defaults to Hz.
    RealImagNPort,
    /// Per-port header and records, `DB Sij`/`Ang Sij`, GHz and radians.
    DbAngleLegacy,
    /// Per-port header one line earlier plus a blank separator,
    /// `db:Sij`/`ang:Sij`, Hz and degrees.
    DbAngleRevised,
}

impl FormatVariant {
    pub const ALL: [FormatVariant; 4] = [
        FormatVariant::RealImag,
        FormatVariant::RealImagNPort,
        FormatVariant::DbAngleLegacy,
        FormatVariant::DbAngleRevised,
    ];

    pub fn layout(self) -> Layout {
        match self {
            FormatVariant::RealImag => Layout {
                encoding: Encoding::RealImag,
                header_offset: 4,
                header_span: LineSpan::Single,
                separator_lines: 0,
                record_span: LineSpan::Single,
                field_prefixes: ["re:", "im:"],
                default_frequency_unit: FrequencyUnit::MHz,
                angle_unit: None,
            },
            FormatVariant::RealImagNPort => Layout {
                encoding: Encoding::RealImag,
                header_offset: 4,
                header_span: LineSpan::Single,
                separator_lines: 0,
                record_span: LineSpan::Single,
                field_prefixes: ["re:", "im:"],
                default_frequency_unit: FrequencyUnit::Hz,
                angle_unit: None,
            },
            FormatVariant::DbAngleLegacy => Layout {
                encoding: Encoding::DbAngle,
                header_offset: 5,
                header_span: LineSpan::PerPort,
                separator_lines: 0,
                record_span: LineSpan::PerPort,
                field_prefixes: ["DB ", "Ang "],
                default_frequency_unit: FrequencyUnit::GHz,
                angle_unit: Some(AngleUnit::Radians),
            },
            FormatVariant::DbAngleRevised => Layout {
                encoding: Encoding::DbAngle,
                header_offset: 4,
                header_span: LineSpan::PerPort,
                separator_lines: 1,
                record_span: LineSpan::PerPort,
                field_prefixes: ["db:", "ang:"],
                default_frequency_unit: FrequencyUnit::Hz,
                angle_unit: Some(AngleUnit::Degrees),
            },
        }
    }

    pub fn encoding(self) -> Encoding {
        self.layout().encoding
    }

    pub fn name(self) -> &'static str {
        match self {
            FormatVariant::RealImag => "real-imag",
            FormatVariant::RealImagNPort => "real-imag-n-port",
            FormatVariant::DbAngleLegacy => "db-angle-legacy",
            FormatVariant::DbAngleRevised => "db-angle-revised",
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatVariant {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        FormatVariant::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| FormatError::UnknownVariant(s.to_string()))
    }
}
